//! StageLight theatre group content service
//!
//! Public content pages and an admin panel for a theatre group website,
//! backed by a hosted Postgres database with an auth service and a realtime
//! change feed. This library provides the data layer, the change-feed sync
//! hook, the toast store, allow-list based admin auth and the admin screen
//! state machines, plus the JSON API that serves them.

#![allow(non_snake_case)]

pub mod config;
pub mod handlers;
pub mod services;
pub mod models;
pub mod database;
pub mod realtime;
pub mod state;
pub mod validation;
pub mod utils;
pub mod middleware;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{StageLightError, Result};

// Re-export main components for easy access
pub use database::DatabaseService;
pub use handlers::create_router;
pub use realtime::{RealtimeHub, SyncHook};
pub use services::{AuthService, ServiceFactory};
pub use state::{AppContext, NotificationStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
