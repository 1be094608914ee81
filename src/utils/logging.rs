//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the StageLight application.

use tracing::{info, warn, error, debug};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};
use crate::config::LoggingConfig;
use crate::utils::errors::{StageLightError, Result};

/// Initialize logging based on configuration
///
/// The returned guard flushes the file writer on drop; keep it alive for the
/// lifetime of the process.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = tracing_subscriber::EnvFilter::try_new(&config.level)
        .map_err(|e| StageLightError::Config(format!("Invalid log filter '{}': {}", config.level, e)))?;

    let stdout_layer = if config.json {
        tracing_subscriber::fmt::layer().json().with_writer(std::io::stdout).boxed()
    } else {
        tracing_subscriber::fmt::layer().with_writer(std::io::stdout).boxed()
    };

    let (file_layer, guard) = match config.directory.as_deref().filter(|d| !d.is_empty()) {
        Some(directory) => {
            let file_appender = tracing_appender::rolling::daily(directory, "stagelight.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(non_blocking)
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| StageLightError::Config(format!("Logging already initialized: {}", e)))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log admin panel mutations
pub fn log_admin_action(admin_email: &str, action: &str, table: &str, target: Option<&str>) {
    warn!(
        admin_email = admin_email,
        action = action,
        table = table,
        target = target,
        "Admin action performed"
    );
}

/// Log sign-in, sign-out and session lifecycle events
pub fn log_auth_event(email: Option<&str>, action: &str, success: bool) {
    if success {
        info!(email = email, action = action, "Authentication event: success");
    } else {
        warn!(email = email, action = action, "Authentication event: failure");
    }
}

/// Log change feed traffic
pub fn log_realtime_event(table: &str, event_type: &str, record_id: Option<&str>) {
    debug!(
        table = table,
        event_type = event_type,
        record_id = record_id,
        "Realtime change received"
    );
}

/// Log database operations
pub fn log_database_operation(operation: &str, table: &str, duration_ms: u64, success: bool) {
    if success {
        debug!(
            operation = operation,
            table = table,
            duration_ms = duration_ms,
            "Database operation completed"
        );
    } else {
        error!(
            operation = operation,
            table = table,
            duration_ms = duration_ms,
            "Database operation failed"
        );
    }
}
