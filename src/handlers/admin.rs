//! Admin API handlers
//!
//! Every route here sits behind [`require_admin`](crate::middleware::require_admin),
//! so the caller's [`AuthContext`] is always present as an extension.

use axum::extract::{Path, State};
use axum::response::Response;
use axum::{Extension, Json};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;
use crate::database::{EntityRepository, ListRepository};
use crate::models::{AdminUser, Message, Record};
use crate::services::AuthContext;
use crate::state::{AppContext, DashboardState, NotificationStore};
use crate::utils::errors::{StageLightError, Result};
use crate::utils::logging::log_admin_action;
use crate::validation::{
    AdminUserForm, EventForm, GalleryForm, TeamMemberForm, Validate, ValidationContext,
};
use super::response::{created, empty_success, success, success_with_message};

/// Number of activity entries shown on the dashboard
const DASHBOARD_ACTIVITY_LIMIT: usize = 10;

fn admin_email(admin: &AuthContext) -> &str {
    admin.email().unwrap_or("unknown")
}

async fn list_records<R: ListRepository>(repo: &R) -> Result<Response> {
    let records = repo.get_all().await?;
    Ok(success(records))
}

async fn create_record<R, F>(repo: &R, toasts: &NotificationStore, admin: &AuthContext, form: F) -> Result<Response>
where
    R: EntityRepository,
    F: Validate<Output = R::Input>,
{
    let entity = <R::Record as Record>::ENTITY;
    let input = form.validate(&ValidationContext::now())?;
    let record = repo
        .create(input)
        .await
        .map_err(|e| report_failure(toasts, "save", entity, e))?;

    let id = record.id().to_string();
    log_admin_action(admin_email(admin), "create", <R::Record as Record>::TABLE.as_str(), Some(&id));
    toasts.success(format!("{} created", entity), record.label());
    Ok(created(record, format!("{} created", entity)))
}

async fn update_record<R, F>(
    repo: &R,
    toasts: &NotificationStore,
    admin: &AuthContext,
    id: Uuid,
    form: F,
) -> Result<Response>
where
    R: EntityRepository,
    F: Validate<Output = R::Input>,
{
    let entity = <R::Record as Record>::ENTITY;
    let input = form.validate(&ValidationContext::now())?;
    let record = repo
        .update(id, input)
        .await
        .map_err(|e| report_failure(toasts, "save", entity, e))?;

    log_admin_action(admin_email(admin), "update", <R::Record as Record>::TABLE.as_str(), Some(&id.to_string()));
    toasts.success(format!("{} updated", entity), record.label());
    Ok(success_with_message(record, format!("{} updated", entity)))
}

async fn delete_record<R: ListRepository>(
    repo: &R,
    toasts: &NotificationStore,
    admin: &AuthContext,
    id: Uuid,
) -> Result<Response> {
    let entity = <R::Record as Record>::ENTITY;
    repo.delete(id)
        .await
        .map_err(|e| report_failure(toasts, "delete", entity, e))?;

    log_admin_action(admin_email(admin), "delete", <R::Record as Record>::TABLE.as_str(), Some(&id.to_string()));
    toasts.success(format!("{} deleted", entity), "The record was removed");
    Ok(empty_success(format!("{} deleted", entity)))
}

/// Queue an error toast for a failed write and hand the error back
fn report_failure(toasts: &NotificationStore, action: &str, entity: &str, error: StageLightError) -> StageLightError {
    toasts.error(format!("Could not {} {}", action, entity.to_lowercase()), error.to_string());
    error
}

/// Counters plus the latest activity, fetched concurrently
pub async fn dashboard(State(ctx): State<AppContext>) -> Result<Response> {
    let (stats, activity) = tokio::try_join!(
        ctx.database.dashboard_stats(),
        ctx.database.recent_activity(DASHBOARD_ACTIVITY_LIMIT),
    )?;

    Ok(success(DashboardState {
        stats: Some(stats),
        activity,
        refreshed_at: Some(Utc::now()),
    }))
}

// Events

pub async fn list_events(State(ctx): State<AppContext>) -> Result<Response> {
    list_records(&ctx.database.events).await
}

pub async fn create_event(
    State(ctx): State<AppContext>,
    Extension(admin): Extension<AuthContext>,
    Json(form): Json<EventForm>,
) -> Result<Response> {
    create_record(&ctx.database.events, &ctx.notifications, &admin, form).await
}

pub async fn update_event(
    State(ctx): State<AppContext>,
    Extension(admin): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(form): Json<EventForm>,
) -> Result<Response> {
    update_record(&ctx.database.events, &ctx.notifications, &admin, id, form).await
}

pub async fn delete_event(
    State(ctx): State<AppContext>,
    Extension(admin): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> Result<Response> {
    delete_record(&ctx.database.events, &ctx.notifications, &admin, id).await
}

// Gallery

pub async fn list_gallery(State(ctx): State<AppContext>) -> Result<Response> {
    list_records(&ctx.database.gallery).await
}

pub async fn create_gallery_item(
    State(ctx): State<AppContext>,
    Extension(admin): Extension<AuthContext>,
    Json(form): Json<GalleryForm>,
) -> Result<Response> {
    create_record(&ctx.database.gallery, &ctx.notifications, &admin, form).await
}

pub async fn update_gallery_item(
    State(ctx): State<AppContext>,
    Extension(admin): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(form): Json<GalleryForm>,
) -> Result<Response> {
    update_record(&ctx.database.gallery, &ctx.notifications, &admin, id, form).await
}

pub async fn delete_gallery_item(
    State(ctx): State<AppContext>,
    Extension(admin): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> Result<Response> {
    delete_record(&ctx.database.gallery, &ctx.notifications, &admin, id).await
}

// Team

pub async fn list_team(State(ctx): State<AppContext>) -> Result<Response> {
    list_records(&ctx.database.team).await
}

pub async fn create_team_member(
    State(ctx): State<AppContext>,
    Extension(admin): Extension<AuthContext>,
    Json(form): Json<TeamMemberForm>,
) -> Result<Response> {
    create_record(&ctx.database.team, &ctx.notifications, &admin, form).await
}

pub async fn update_team_member(
    State(ctx): State<AppContext>,
    Extension(admin): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(form): Json<TeamMemberForm>,
) -> Result<Response> {
    update_record(&ctx.database.team, &ctx.notifications, &admin, id, form).await
}

pub async fn delete_team_member(
    State(ctx): State<AppContext>,
    Extension(admin): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> Result<Response> {
    delete_record(&ctx.database.team, &ctx.notifications, &admin, id).await
}

// Admin users directory

pub async fn list_admins(State(ctx): State<AppContext>) -> Result<Response> {
    list_records(&ctx.database.admin_users).await
}

pub async fn create_admin(
    State(ctx): State<AppContext>,
    Extension(admin): Extension<AuthContext>,
    Json(form): Json<AdminUserForm>,
) -> Result<Response> {
    create_record(&ctx.database.admin_users, &ctx.notifications, &admin, form).await
}

pub async fn update_admin(
    State(ctx): State<AppContext>,
    Extension(admin): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(form): Json<AdminUserForm>,
) -> Result<Response> {
    update_record(&ctx.database.admin_users, &ctx.notifications, &admin, id, form).await
}

#[derive(Debug, Deserialize)]
pub struct ActiveFlag {
    pub is_active: bool,
}

pub async fn set_admin_active(
    State(ctx): State<AppContext>,
    Extension(admin): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(flag): Json<ActiveFlag>,
) -> Result<Response> {
    let toasts = &ctx.notifications;
    let record = ctx
        .database
        .admin_users
        .set_active(id, flag.is_active)
        .await
        .map_err(|e| report_failure(toasts, "update", AdminUser::ENTITY, e))?;

    let (action, verb) = if flag.is_active { ("activate", "activated") } else { ("deactivate", "deactivated") };
    log_admin_action(admin_email(&admin), action, AdminUser::TABLE.as_str(), Some(&id.to_string()));
    toasts.success(format!("{} {}", AdminUser::ENTITY, verb), record.label());
    Ok(success_with_message(record, format!("{} {}", AdminUser::ENTITY, verb)))
}

pub async fn delete_admin(
    State(ctx): State<AppContext>,
    Extension(admin): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> Result<Response> {
    delete_record(&ctx.database.admin_users, &ctx.notifications, &admin, id).await
}

// Messages inbox

pub async fn list_messages(State(ctx): State<AppContext>) -> Result<Response> {
    list_records(&ctx.database.messages).await
}

pub async fn mark_message_read(
    State(ctx): State<AppContext>,
    Extension(admin): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> Result<Response> {
    let toasts = &ctx.notifications;
    let message = ctx
        .database
        .messages
        .mark_as_read(id)
        .await
        .map_err(|e| report_failure(toasts, "update", Message::ENTITY, e))?;

    log_admin_action(admin_email(&admin), "mark_read", Message::TABLE.as_str(), Some(&id.to_string()));
    toasts.success("Message marked as read", message.label());
    Ok(success_with_message(message, "Message marked as read"))
}

pub async fn delete_message(
    State(ctx): State<AppContext>,
    Extension(admin): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> Result<Response> {
    delete_record(&ctx.database.messages, &ctx.notifications, &admin, id).await
}

// Toasts

pub async fn list_notifications(State(ctx): State<AppContext>) -> Result<Response> {
    Ok(success(ctx.notifications.list()))
}

/// Dismiss a toast; unknown ids are ignored
pub async fn dismiss_notification(State(ctx): State<AppContext>, Path(id): Path<Uuid>) -> Result<Response> {
    ctx.notifications.remove(id);
    Ok(empty_success("Notification dismissed"))
}
