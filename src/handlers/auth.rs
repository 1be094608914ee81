//! Admin sign-in handlers

use std::net::SocketAddr;
use axum::extract::{ConnectInfo, State};
use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::Response;
use axum::Json;
use serde::Serialize;
use crate::middleware::{session_token, LimitScope, SESSION_COOKIE};
use crate::services::AuthContext;
use crate::state::AppContext;
use crate::utils::errors::{StageLightError, Result};
use crate::validation::{LoginForm, Validate, ValidationContext};
use super::response::{empty_success, success, success_with_message};

#[derive(Debug, Serialize)]
pub struct LoginPayload {
    /// Session token for clients that prefer a bearer header over the cookie
    pub token: String,
    pub session: AuthContext,
}

fn session_cookie(token: &str, max_age_seconds: u64) -> Result<HeaderValue> {
    let cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, token, max_age_seconds
    );
    HeaderValue::from_str(&cookie).map_err(|e| StageLightError::InvalidInput(e.to_string()))
}

pub async fn login(
    State(ctx): State<AppContext>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Json(form): Json<LoginForm>,
) -> Result<Response> {
    let client = ctx.rate_limits.client_ip(&headers, peer.map(|ConnectInfo(addr)| addr));
    ctx.rate_limits.check(LimitScope::Login, client)?;

    let credentials = form.validate(&ValidationContext::now())?;
    let signed_in = ctx.auth.sign_in(credentials).await?;

    let cookie = session_cookie(&signed_in.token, ctx.settings.auth.session_ttl_seconds)?;
    let payload = LoginPayload {
        token: signed_in.token,
        session: signed_in.context,
    };

    let mut response = success_with_message(payload, "Signed in");
    response.headers_mut().insert(header::SET_COOKIE, cookie);
    Ok(response)
}

pub async fn logout(State(ctx): State<AppContext>, headers: HeaderMap) -> Result<Response> {
    if let Some(token) = session_token(&headers) {
        ctx.auth.sign_out(&token).await?;
    }

    let mut response = empty_success("Signed out");
    response.headers_mut().insert(header::SET_COOKIE, session_cookie("", 0)?);
    Ok(response)
}

/// The caller's current session, anonymous when there is none
pub async fn session(State(ctx): State<AppContext>, headers: HeaderMap) -> Result<Response> {
    let token = session_token(&headers);
    let context = ctx.auth.context(token.as_deref()).await?;
    Ok(success(context))
}
