//! HTTP handlers module
//!
//! This module contains the JSON API organized by audience:
//! - Public handlers for the site pages and forms
//! - Auth handlers for admin sign-in
//! - Admin handlers for content management, guarded by the allow-list
//! - The server-sent change stream

pub mod admin;
pub mod auth;
pub mod changes;
pub mod public;
pub mod response;

use std::time::Duration;
use axum::extract::State;
use axum::http::{header, HeaderName, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{middleware as axum_middleware, Json, Router};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use crate::middleware::{log_requests, require_admin};
use crate::state::AppContext;

pub use response::{ApiResponse, ApiErrorBody, ApiErrorResponse};

const PREFLIGHT_MAX_AGE_SECS: u64 = 86400;

/// Build the full application router
pub fn create_router(ctx: AppContext) -> Router {
    let admin = Router::new()
        .route("/dashboard", get(admin::dashboard))
        .route("/events", get(admin::list_events).post(admin::create_event))
        .route("/events/:id", put(admin::update_event).delete(admin::delete_event))
        .route("/gallery", get(admin::list_gallery).post(admin::create_gallery_item))
        .route("/gallery/:id", put(admin::update_gallery_item).delete(admin::delete_gallery_item))
        .route("/team", get(admin::list_team).post(admin::create_team_member))
        .route("/team/:id", put(admin::update_team_member).delete(admin::delete_team_member))
        .route("/admins", get(admin::list_admins).post(admin::create_admin))
        .route("/admins/:id", put(admin::update_admin).delete(admin::delete_admin))
        .route("/admins/:id/active", put(admin::set_admin_active))
        .route("/messages", get(admin::list_messages))
        .route("/messages/:id", axum::routing::delete(admin::delete_message))
        .route("/messages/:id/read", post(admin::mark_message_read))
        .route("/notifications", get(admin::list_notifications))
        .route("/notifications/:id", axum::routing::delete(admin::dismiss_notification))
        .route("/changes/:table", get(changes::stream_changes))
        .route_layer(axum_middleware::from_fn_with_state(ctx.clone(), require_admin));

    let api = Router::new()
        .route("/home", get(public::home))
        .route("/events", get(public::events))
        .route("/gallery", get(public::gallery))
        .route("/team", get(public::team))
        .route("/departments", get(public::departments))
        .route("/contact", post(public::contact))
        .route("/join", post(public::join))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/session", get(auth::session))
        .nest("/admin", admin);

    let cors = create_cors_layer(&ctx.settings.server.allowed_origins);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api)
        .fallback(not_found)
        .with_state(ctx)
        .layer(axum_middleware::from_fn(log_requests))
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(cors)
}

/// CORS for the configured front-end origins
///
/// Credentials are allowed so the session cookie travels with requests,
/// which rules out a wildcard origin.
pub fn create_cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| {
            let trimmed = origin.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.parse::<HeaderValue>() {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::warn!("CORS: Invalid origin '{}': {}", trimmed, e);
                    None
                }
            }
        })
        .collect();

    tracing::debug!("CORS: Configured with {} allowed origin(s)", origins.len());

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            HeaderName::from_static("x-requested-with"),
        ])
        .allow_credentials(true)
        .max_age(Duration::from_secs(PREFLIGHT_MAX_AGE_SECS))
}

pub async fn health_check(State(ctx): State<AppContext>) -> Response {
    let health = ctx.health().await;
    let status = if health.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let body = ApiResponse {
        success: health.is_healthy(),
        message: Some(health.get_issues().join("; ")).filter(|issues| !issues.is_empty()),
        data: Some(health),
    };
    (status, Json(body)).into_response()
}

pub async fn not_found() -> Response {
    response::error("NOT_FOUND", "Page not found", None, StatusCode::NOT_FOUND)
}
