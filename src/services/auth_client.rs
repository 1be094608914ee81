//! Hosted auth provider client
//!
//! Credential verification is delegated to the backend's auth REST API. The
//! [`AuthProvider`] trait is the seam the rest of the crate talks to;
//! [`GoTrueClient`] implements it over HTTP.

use std::time::Duration;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};
use crate::config::BackendConfig;
use crate::utils::errors::{StageLightError, Result};

/// Identity returned by the auth provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// A provider session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub user: AuthUser,
}

impl Session {
    /// Whether the access token expires within `margin` of `now`
    pub fn expires_within(&self, margin: chrono::Duration, now: DateTime<Utc>) -> bool {
        self.expires_at - now <= margin
    }
}

#[async_trait]
pub trait AuthProvider: Send + Sync + 'static {
    /// Verify credentials; wrong credentials fail with [`StageLightError::AccessDenied`]
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session>;

    /// Exchange a refresh token for a new session
    async fn refresh_session(&self, refresh_token: &str) -> Result<Session>;

    async fn get_user(&self, access_token: &str) -> Result<AuthUser>;

    async fn sign_out(&self, access_token: &str) -> Result<()>;
}

/// Token endpoint response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: AuthUser,
}

impl TokenResponse {
    fn into_session(self, now: DateTime<Utc>) -> Result<Session> {
        let expires_at = match self.expires_at.and_then(|at| Utc.timestamp_opt(at, 0).single()) {
            Some(at) => at,
            None => match token_expiry(&self.access_token) {
                Ok(at) => at,
                Err(e) => {
                    let expires_in = self.expires_in.ok_or(e)?;
                    now + chrono::Duration::seconds(expires_in)
                }
            },
        };

        Ok(Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: self.user,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ExpiryClaims {
    exp: i64,
}

/// Read the `exp` claim of an access token
///
/// The signature is not checked: the token was just received from the
/// provider over TLS and is only used to schedule refreshes.
pub fn token_expiry(token: &str) -> Result<DateTime<Utc>> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = decode::<ExpiryClaims>(token, &DecodingKey::from_secret(&[]), &validation)?;
    Utc.timestamp_opt(data.claims.exp, 0)
        .single()
        .ok_or_else(|| StageLightError::Backend(format!("Invalid exp claim: {}", data.claims.exp)))
}

/// Client for the hosted auth REST API
#[derive(Clone, Debug)]
pub struct GoTrueClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl GoTrueClient {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .user_agent(concat!("StageLight/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
        })
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    async fn token_grant(&self, grant_type: &str, body: serde_json::Value) -> Result<reqwest::Response> {
        let url = format!("{}?grant_type={}", self.auth_url("token"), grant_type);
        debug!(grant_type = grant_type, "Requesting auth token");

        let response = self
            .client
            .post(&url)
            .header("apikey", &self.anon_key)
            .json(&body)
            .send()
            .await?;

        Ok(response)
    }
}

async fn backend_error(context: &str, response: reqwest::Response) -> StageLightError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    error!(status = %status, body_length = body.len(), "{}", context);
    StageLightError::Backend(format!("{}: {}", context, status))
}

#[async_trait]
impl AuthProvider for GoTrueClient {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session> {
        let response = self
            .token_grant("password", serde_json::json!({ "email": email, "password": password }))
            .await?;

        match response.status() {
            status if status.is_success() => {
                let token: TokenResponse = response.json().await?;
                token.into_session(Utc::now())
            }
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::UNPROCESSABLE_ENTITY => {
                warn!(status = %response.status(), "Auth provider rejected credentials");
                Err(StageLightError::AccessDenied)
            }
            _ => Err(backend_error("Sign-in request failed", response).await),
        }
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session> {
        let response = self
            .token_grant("refresh_token", serde_json::json!({ "refresh_token": refresh_token }))
            .await?;

        match response.status() {
            status if status.is_success() => {
                let token: TokenResponse = response.json().await?;
                token.into_session(Utc::now())
            }
            status if status.is_client_error() => {
                warn!(status = %status, "Refresh token rejected");
                Err(StageLightError::Unauthenticated)
            }
            _ => Err(backend_error("Token refresh failed", response).await),
        }
    }

    async fn get_user(&self, access_token: &str) -> Result<AuthUser> {
        let response = self
            .client
            .get(self.auth_url("user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(response.json().await?),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(StageLightError::Unauthenticated),
            _ => Err(backend_error("User lookup failed", response).await),
        }
    }

    async fn sign_out(&self, access_token: &str) -> Result<()> {
        let response = self
            .client
            .post(self.auth_url("logout"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            // Already invalid on the provider side
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => Ok(()),
            _ => Err(backend_error("Sign-out request failed", response).await),
        }
    }
}
