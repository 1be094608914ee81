//! Authentication middleware
//!
//! Guards the admin API. The session token travels either as a bearer token
//! or in the `stagelight_session` cookie.

use axum::extract::{OriginalUri, Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::{debug, warn};
use crate::handlers::response::unauthenticated;
use crate::state::AppContext;
use crate::utils::errors::StageLightError;

/// Cookie carrying the admin session token
pub const SESSION_COOKIE: &str = "stagelight_session";

/// Extract the session token from the request headers
///
/// A bearer token wins over the cookie.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());

    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// Where an unauthenticated browser is sent, remembering the requested path
pub fn login_redirect(path: &str) -> String {
    format!("/login?redirect={}", urlencoding::encode(path))
}

/// Admin guard
///
/// No session or an expired one answers 401 with a login redirect; a signed
/// in user outside the allow-list answers 403. On success the caller's
/// [`AuthContext`](crate::services::AuthContext) is available to handlers as
/// a request extension.
pub async fn require_admin(State(ctx): State<AppContext>, mut request: Request, next: Next) -> Response {
    let token = session_token(request.headers());
    // Nested routers strip their prefix from the request URI
    let path = request
        .extensions()
        .get::<OriginalUri>()
        .map(|OriginalUri(uri)| uri.path().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    match ctx.auth.require_admin(token.as_deref()).await {
        Ok(context) => {
            debug!(email = context.email().unwrap_or("unknown"), path = %path, "Admin request authorized");
            request.extensions_mut().insert(context);
            next.run(request).await
        }
        Err(StageLightError::Unauthenticated) => {
            debug!(path = %path, "Admin request without a session");
            unauthenticated(&login_redirect(&path))
        }
        Err(e) => {
            if matches!(e, StageLightError::AccessDenied) {
                warn!(path = %path, "Unauthorized admin access attempt");
            }
            e.into_response()
        }
    }
}
