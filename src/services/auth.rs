//! Authentication service implementation
//!
//! Admin access is decided by a configured email allow-list. Credentials are
//! verified by the hosted auth provider, but only for emails already on the
//! list: anyone else is turned away before the provider is contacted.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use chrono::Utc;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, warn};
use crate::config::AuthConfig;
use crate::utils::errors::{StageLightError, Result};
use crate::utils::helpers::{generate_random_string, normalize_email};
use crate::utils::logging::log_auth_event;
use crate::validation::Credentials;
use super::auth_client::{AuthProvider, AuthUser, Session};
use super::session_store::SessionStore;

const SESSION_TOKEN_LENGTH: usize = 48;

/// The admin allow-list
#[derive(Debug, Clone, Default)]
pub struct AdminPolicy {
    emails: HashSet<String>,
}

impl AdminPolicy {
    pub fn new<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            emails: emails
                .into_iter()
                .map(|email| normalize_email(email.as_ref()))
                .filter(|email| !email.is_empty())
                .collect(),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(&config.admin_emails)
    }

    /// Check an email against the list, ignoring case and surrounding whitespace
    pub fn is_authorized(&self, email: &str) -> bool {
        self.emails.contains(&normalize_email(email))
    }

    pub fn len(&self) -> usize {
        self.emails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }
}

/// Session lifecycle notifications
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AuthEvent {
    SignedIn { email: String },
    SignedOut { email: Option<String> },
    TokenRefreshed { email: Option<String> },
    Expired { email: Option<String> },
}

/// What a request knows about its caller
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AuthContext {
    pub user: Option<AuthUser>,
    pub expires_at: Option<chrono::DateTime<Utc>>,
    pub is_admin: bool,
}

impl AuthContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn email(&self) -> Option<&str> {
        self.user.as_ref().and_then(|user| user.email.as_deref())
    }
}

/// A successful sign-in
#[derive(Debug, Clone)]
pub struct SignedIn {
    /// Opaque token identifying the stored session
    pub token: String,
    pub context: AuthContext,
}

/// Authentication service for admin sign-in and session checks
#[derive(Clone)]
pub struct AuthService {
    provider: Arc<dyn AuthProvider>,
    sessions: Arc<dyn SessionStore>,
    policy: AdminPolicy,
    events: broadcast::Sender<AuthEvent>,
    session_ttl: Duration,
    refresh_margin: chrono::Duration,
}

impl AuthService {
    pub fn new(
        provider: Arc<dyn AuthProvider>,
        sessions: Arc<dyn SessionStore>,
        config: &AuthConfig,
    ) -> Self {
        let (events, _receiver) = broadcast::channel(64);
        Self {
            provider,
            sessions,
            policy: AdminPolicy::from_config(config),
            events,
            session_ttl: Duration::from_secs(config.session_ttl_seconds),
            refresh_margin: chrono::Duration::seconds(config.refresh_margin_seconds),
        }
    }

    pub fn policy(&self) -> &AdminPolicy {
        &self.policy
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    pub fn is_admin(&self, email: &str) -> bool {
        self.policy.is_authorized(email)
    }

    /// Sign an admin in
    ///
    /// Emails outside the allow-list, wrong passwords and provider-side
    /// rejections all fail with the same [`StageLightError::AccessDenied`].
    pub async fn sign_in(&self, credentials: Credentials) -> Result<SignedIn> {
        let email = normalize_email(&credentials.email);

        if !self.policy.is_authorized(&email) {
            log_auth_event(Some(&email), "sign_in_not_allowed", false);
            return Err(StageLightError::AccessDenied);
        }

        let session = match self.provider.sign_in_with_password(&email, &credentials.password).await {
            Ok(session) => session,
            Err(StageLightError::AccessDenied) => {
                log_auth_event(Some(&email), "sign_in_rejected", false);
                return Err(StageLightError::AccessDenied);
            }
            Err(e) => {
                log_auth_event(Some(&email), "sign_in_error", false);
                return Err(e);
            }
        };

        // The provider may normalise the address differently
        let confirmed = session.user.email.as_deref().map(|e| self.policy.is_authorized(e)).unwrap_or(false);
        if !confirmed {
            warn!(email = %email, "Provider identity is not on the allow-list");
            if let Err(e) = self.provider.sign_out(&session.access_token).await {
                warn!(error = %e, "Failed to revoke provider session");
            }
            log_auth_event(Some(&email), "sign_in_identity_mismatch", false);
            return Err(StageLightError::AccessDenied);
        }

        let token = generate_random_string(SESSION_TOKEN_LENGTH);
        self.sessions.save(&token, &session, self.session_ttl).await?;

        log_auth_event(Some(&email), "sign_in", true);
        let _ = self.events.send(AuthEvent::SignedIn { email });

        Ok(SignedIn {
            token,
            context: self.context_for(&session),
        })
    }

    /// Sign out; unknown tokens are ignored
    pub async fn sign_out(&self, token: &str) -> Result<()> {
        let session = match self.sessions.load(token).await? {
            Some(session) => session,
            None => return Ok(()),
        };

        if let Err(e) = self.provider.sign_out(&session.access_token).await {
            warn!(error = %e, "Provider sign-out failed, dropping local session anyway");
        }
        self.sessions.delete(token).await?;

        let email = session.user.email.clone();
        log_auth_event(email.as_deref(), "sign_out", true);
        let _ = self.events.send(AuthEvent::SignedOut { email });
        Ok(())
    }

    /// Resolve the caller behind a session token
    ///
    /// Refreshes the access token when it is about to expire. A failed
    /// refresh ends the session and yields an anonymous context.
    pub async fn context(&self, token: Option<&str>) -> Result<AuthContext> {
        let token = match token.filter(|t| !t.is_empty()) {
            Some(token) => token,
            None => return Ok(AuthContext::anonymous()),
        };

        let session = match self.sessions.load(token).await? {
            Some(session) => session,
            None => return Ok(AuthContext::anonymous()),
        };

        if !session.expires_within(self.refresh_margin, Utc::now()) {
            return Ok(self.context_for(&session));
        }

        debug!("Access token close to expiry, refreshing");
        let email = session.user.email.clone();

        match self.provider.refresh_session(&session.refresh_token).await {
            Ok(refreshed) => {
                self.sessions.save(token, &refreshed, self.session_ttl).await?;
                log_auth_event(email.as_deref(), "token_refreshed", true);
                let _ = self.events.send(AuthEvent::TokenRefreshed { email });
                Ok(self.context_for(&refreshed))
            }
            Err(StageLightError::Unauthenticated) => {
                warn!("Refresh token rejected, expiring session");
                self.sessions.delete(token).await?;
                log_auth_event(email.as_deref(), "session_expired", false);
                let _ = self.events.send(AuthEvent::Expired { email });
                Ok(AuthContext::anonymous())
            }
            // The provider could not answer; the session stays for the next attempt
            Err(e) if session.expires_at > Utc::now() => {
                warn!(error = %e, "Session refresh failed, using current access token");
                Ok(self.context_for(&session))
            }
            Err(e) => {
                warn!(error = %e, "Session refresh failed after access token expired");
                Err(e)
            }
        }
    }

    /// Resolve the caller and require an allow-listed admin
    pub async fn require_admin(&self, token: Option<&str>) -> Result<AuthContext> {
        let context = self.context(token).await?;
        if !context.is_authenticated() {
            return Err(StageLightError::Unauthenticated);
        }
        if !context.is_admin {
            return Err(StageLightError::AccessDenied);
        }
        Ok(context)
    }

    fn context_for(&self, session: &Session) -> AuthContext {
        let is_admin = session
            .user
            .email
            .as_deref()
            .map(|email| self.policy.is_authorized(email))
            .unwrap_or(false);

        AuthContext {
            user: Some(session.user.clone()),
            expires_at: Some(session.expires_at),
            is_admin,
        }
    }
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("admins", &self.policy.len())
            .field("session_ttl", &self.session_ttl)
            .finish_non_exhaustive()
    }
}
