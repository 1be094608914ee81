//! Public site handlers
//!
//! Read-only content for the home, events, gallery and team pages plus the
//! two public forms that land in the admin inbox.

use std::net::SocketAddr;
use axum::extract::{ConnectInfo, State};
use axum::http::HeaderMap;
use axum::response::Response;
use axum::Json;
use tracing::info;
use crate::middleware::LimitScope;
use crate::state::AppContext;
use crate::utils::errors::Result;
use crate::validation::{ContactForm, JoinForm, Validate, ValidationContext};
use super::response::{created, success};

pub async fn home(State(ctx): State<AppContext>) -> Result<Response> {
    let content = ctx.database.home_content().await?;
    Ok(success(content))
}

/// All events, newest date first
pub async fn events(State(ctx): State<AppContext>) -> Result<Response> {
    let events = ctx.database.events.get_all().await?;
    Ok(success(events))
}

pub async fn gallery(State(ctx): State<AppContext>) -> Result<Response> {
    let items = ctx.database.gallery.get_all().await?;
    Ok(success(items))
}

pub async fn team(State(ctx): State<AppContext>) -> Result<Response> {
    let members = ctx.database.team.get_all().await?;
    Ok(success(members))
}

/// Departments offered by the join form
pub async fn departments(State(ctx): State<AppContext>) -> Result<Response> {
    let departments = ctx.database.departments.get_all().await?;
    Ok(success(departments))
}

pub async fn contact(
    State(ctx): State<AppContext>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Json(form): Json<ContactForm>,
) -> Result<Response> {
    let client = ctx.rate_limits.client_ip(&headers, peer.map(|ConnectInfo(addr)| addr));
    ctx.rate_limits.check(LimitScope::Forms, client)?;

    let input = form.validate(&ValidationContext::now())?;
    let message = ctx.database.messages.create(input).await?;

    info!(message_id = %message.id, "Contact message received");
    Ok(created(message.id, "Thank you, your message has been sent"))
}

pub async fn join(
    State(ctx): State<AppContext>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Json(form): Json<JoinForm>,
) -> Result<Response> {
    let client = ctx.rate_limits.client_ip(&headers, peer.map(|ConnectInfo(addr)| addr));
    ctx.rate_limits.check(LimitScope::Forms, client)?;

    let application = form.validate(&ValidationContext::now())?;
    let message = ctx.database.submit_join_application(application).await?;

    info!(message_id = %message.id, "Join application received");
    Ok(created(message.id, "Thank you, we will be in touch soon"))
}
