//! Application context
//!
//! Everything a request handler needs, built once in `main` and handed to
//! the router as shared state.

use std::sync::Arc;
use crate::config::Settings;
use crate::database::{DatabasePool, DatabaseService};
use crate::middleware::RateLimitMiddleware;
use crate::realtime::RealtimeHub;
use crate::services::{AuthService, ServiceFactory, ServiceHealthStatus};
use super::notifications::NotificationStore;

/// Application-wide context containing services and settings
#[derive(Debug, Clone)]
pub struct AppContext {
    pub settings: Arc<Settings>,
    pub pool: DatabasePool,
    pub database: Arc<DatabaseService>,
    pub auth: AuthService,
    pub services: Arc<ServiceFactory>,
    pub hub: RealtimeHub,
    pub notifications: NotificationStore,
    pub rate_limits: RateLimitMiddleware,
}

impl AppContext {
    /// Create from ServiceFactory and the database pool
    pub fn new(settings: Settings, pool: DatabasePool, services: ServiceFactory, hub: RealtimeHub) -> Self {
        let database = Arc::new(DatabaseService::new(pool.clone()));
        let notifications = NotificationStore::from_config(&settings.notifications);
        let rate_limits = RateLimitMiddleware::new(&settings.rate_limit)
            .with_trusted_proxies(&settings.server.trusted_proxies);

        Self {
            auth: services.auth_service.clone(),
            settings: Arc::new(settings),
            pool,
            database,
            services: Arc::new(services),
            hub,
            notifications,
            rate_limits,
        }
    }

    /// Health of the database, session store and change feed
    pub async fn health(&self) -> ServiceHealthStatus {
        self.services.health_check(&self.pool, &self.hub).await
    }
}
