//! Rate limiting middleware
//!
//! Login attempts and public form submissions are limited per client IP so
//! the contact inbox and the auth provider are not flooded. The client IP is
//! the peer address unless the peer is a configured reverse proxy.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;
use axum::http::HeaderMap;
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use tracing::{debug, warn};
use crate::config::RateLimitConfig;
use crate::utils::errors::{StageLightError, Result};

/// Which quota a request is charged against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitScope {
    Login,
    Forms,
}

impl LimitScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            LimitScope::Login => "login",
            LimitScope::Forms => "forms",
        }
    }
}

/// Rate limiting middleware
#[derive(Clone)]
pub struct RateLimitMiddleware {
    login: Arc<DefaultKeyedRateLimiter<IpAddr>>,
    forms: Arc<DefaultKeyedRateLimiter<IpAddr>>,
    trusted_proxies: Arc<Vec<IpAddr>>,
}

impl RateLimitMiddleware {
    /// Create a new RateLimitMiddleware instance
    ///
    /// Zero limits are rejected by settings validation; they are clamped to
    /// one here so construction cannot fail.
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            login: Arc::new(RateLimiter::keyed(per_minute(config.login_per_minute))),
            forms: Arc::new(RateLimiter::keyed(per_minute(config.forms_per_minute))),
            trusted_proxies: Arc::new(Vec::new()),
        }
    }

    /// Believe `X-Forwarded-For` from these peers
    ///
    /// Entries that are not IP addresses are skipped; settings validation
    /// rejects them at startup.
    pub fn with_trusted_proxies<I, S>(mut self, proxies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let proxies = proxies
            .into_iter()
            .filter_map(|proxy| proxy.as_ref().trim().parse::<IpAddr>().ok())
            .collect();
        self.trusted_proxies = Arc::new(proxies);
        self
    }

    /// Address a request is charged against
    ///
    /// A direct peer is the client. Behind a trusted proxy the client is the
    /// last `X-Forwarded-For` hop that is not itself a trusted proxy.
    /// Requests without any address share the unspecified key.
    pub fn client_ip(&self, headers: &HeaderMap, peer: Option<SocketAddr>) -> IpAddr {
        let peer = match peer {
            Some(addr) => addr.ip(),
            None => return IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };

        if !self.is_trusted(peer) {
            return peer;
        }

        headers
            .get_all("x-forwarded-for")
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(','))
            .filter_map(|hop| hop.trim().parse::<IpAddr>().ok())
            .filter(|hop| !self.is_trusted(*hop))
            .last()
            .unwrap_or(peer)
    }

    fn is_trusted(&self, addr: IpAddr) -> bool {
        self.trusted_proxies.contains(&addr)
    }

    /// Check if a client is rate limited for the given scope
    pub fn check(&self, scope: LimitScope, client: IpAddr) -> Result<()> {
        let limiter = match scope {
            LimitScope::Login => &self.login,
            LimitScope::Forms => &self.forms,
        };

        match limiter.check_key(&client) {
            Ok(()) => {
                debug!(client = %client, scope = scope.as_str(), "Rate limit check passed");
                Ok(())
            }
            Err(_) => {
                warn!(client = %client, scope = scope.as_str(), "Rate limit exceeded");
                Err(StageLightError::RateLimitExceeded)
            }
        }
    }

    /// Drop state for clients whose quota has fully replenished
    pub fn cleanup_old_entries(&self) {
        self.login.retain_recent();
        self.forms.retain_recent();
        debug!(
            login_entries = self.login.len(),
            form_entries = self.forms.len(),
            "Cleaned up old rate limit entries"
        );
    }
}

impl std::fmt::Debug for RateLimitMiddleware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimitMiddleware")
            .field("trusted_proxies", &self.trusted_proxies)
            .finish_non_exhaustive()
    }
}

fn per_minute(limit: u32) -> Quota {
    Quota::per_minute(NonZeroU32::new(limit).unwrap_or(NonZeroU32::MIN))
}
