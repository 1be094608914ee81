//! Services module
//!
//! This module contains business logic services

pub mod auth;
pub mod auth_client;
pub mod session_store;

// Re-export commonly used services
pub use auth::{AdminPolicy, AuthContext, AuthEvent, AuthService, SignedIn};
pub use auth_client::{AuthProvider, AuthUser, GoTrueClient, Session, token_expiry};
pub use session_store::{MemorySessionStore, RedisSessionStore, SessionStore};

use std::sync::Arc;
use serde::Serialize;
use tracing::{info, warn};
use crate::config::settings::Settings;
use crate::database::{health_check as database_health_check, DatabasePool};
use crate::realtime::{HubStatus, RealtimeHub};
use crate::utils::errors::Result;

/// Service factory for creating and managing all services
#[derive(Clone)]
pub struct ServiceFactory {
    pub auth_service: AuthService,
    pub redis_sessions: Option<RedisSessionStore>,
}

impl ServiceFactory {
    /// Create the auth stack from settings
    ///
    /// Sessions go to Redis when `redis.url` is set and stay in memory
    /// otherwise.
    pub async fn new(settings: &Settings) -> Result<Self> {
        let provider: Arc<dyn AuthProvider> = Arc::new(GoTrueClient::new(&settings.backend)?);
        Self::with_provider(settings, provider).await
    }

    /// Same as [`ServiceFactory::new`] with a caller-supplied auth provider
    pub async fn with_provider(settings: &Settings, provider: Arc<dyn AuthProvider>) -> Result<Self> {
        let (sessions, redis_sessions): (Arc<dyn SessionStore>, Option<RedisSessionStore>) =
            if settings.redis.url.trim().is_empty() {
                warn!("No Redis URL configured, admin sessions are kept in memory");
                (Arc::new(MemorySessionStore::new()), None)
            } else {
                let store = RedisSessionStore::new(&settings.redis).await?;
                info!("Admin sessions stored in Redis");
                (Arc::new(store.clone()), Some(store))
            };

        let auth_service = AuthService::new(provider, sessions, &settings.auth);

        Ok(Self {
            auth_service,
            redis_sessions,
        })
    }

    /// Health check for all services
    pub async fn health_check(&self, pool: &DatabasePool, hub: &RealtimeHub) -> ServiceHealthStatus {
        let database_healthy = database_health_check(pool).await.is_ok();
        let redis_healthy = match &self.redis_sessions {
            Some(store) => Some(store.test_connection().await.is_ok()),
            None => None,
        };

        ServiceHealthStatus {
            database_healthy,
            redis_healthy,
            realtime: hub.status(),
        }
    }
}

impl std::fmt::Debug for ServiceFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceFactory")
            .field("auth_service", &self.auth_service)
            .field("redis_sessions", &self.redis_sessions)
            .finish()
    }
}

/// Health status for all services
#[derive(Debug, Clone, Serialize)]
pub struct ServiceHealthStatus {
    pub database_healthy: bool,
    /// `None` when sessions are kept in memory
    pub redis_healthy: Option<bool>,
    pub realtime: HubStatus,
}

impl ServiceHealthStatus {
    /// The realtime feed is optional; everything else must be up
    pub fn is_healthy(&self) -> bool {
        self.database_healthy && self.redis_healthy.unwrap_or(true)
    }

    /// Get list of unhealthy services
    pub fn get_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if !self.database_healthy {
            issues.push("Database connection failed".to_string());
        }
        if self.redis_healthy == Some(false) {
            issues.push("Redis connection failed".to_string());
        }
        if self.realtime == HubStatus::Disconnected {
            issues.push("Realtime change feed disconnected".to_string());
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_factory_without_redis_keeps_sessions_in_memory() {
        let mut settings = Settings::default();
        settings.redis.url = String::new();

        let factory = ServiceFactory::new(&settings).await.unwrap();

        assert!(factory.redis_sessions.is_none());
        let debug = format!("{:?}", factory);
        assert!(debug.starts_with("ServiceFactory"));
        assert!(debug.contains("redis_sessions: None"));
    }

    #[test]
    fn test_health_status_issues() {
        let status = ServiceHealthStatus {
            database_healthy: true,
            redis_healthy: None,
            realtime: HubStatus::Disconnected,
        };

        assert!(status.is_healthy());
        assert_eq!(status.get_issues(), vec!["Realtime change feed disconnected".to_string()]);

        let status = ServiceHealthStatus {
            database_healthy: false,
            redis_healthy: Some(false),
            realtime: HubStatus::Connected,
        };
        assert!(!status.is_healthy());
        assert_eq!(status.get_issues().len(), 2);
    }
}
