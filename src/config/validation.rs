//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{StageLightError, Result};
use crate::utils::helpers::is_valid_email;
use super::Settings;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_backend_config(&settings.backend)?;
    validate_auth_config(&settings.auth)?;
    validate_server_config(&settings.server)?;
    validate_realtime_config(&settings.realtime)?;
    validate_notifications_config(&settings.notifications)?;
    validate_rate_limit_config(&settings.rate_limit)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate hosted backend configuration
fn validate_backend_config(config: &super::BackendConfig) -> Result<()> {
    if config.url.trim().is_empty() {
        return Err(StageLightError::Config(
            "Backend URL is required (STAGELIGHT__BACKEND__URL)".to_string()
        ));
    }

    if config.anon_key.trim().is_empty() {
        return Err(StageLightError::Config(
            "Backend public API key is required (STAGELIGHT__BACKEND__ANON_KEY)".to_string()
        ));
    }

    let url = url::Url::parse(&config.url)?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(StageLightError::Config(
            format!("Backend URL must use http or https, got '{}'", url.scheme())
        ));
    }

    if config.database_url.is_empty() {
        return Err(StageLightError::Config(
            "Database URL is required".to_string()
        ));
    }

    if config.max_connections == 0 {
        return Err(StageLightError::Config(
            "Max connections must be greater than 0".to_string()
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(StageLightError::Config(
            "Min connections cannot be greater than max connections".to_string()
        ));
    }

    if config.request_timeout_seconds == 0 {
        return Err(StageLightError::Config(
            "Backend request timeout must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate admin access configuration
fn validate_auth_config(config: &super::AuthConfig) -> Result<()> {
    if config.admin_emails.is_empty() {
        return Err(StageLightError::Config(
            "At least one admin email must be configured".to_string()
        ));
    }

    if let Some(invalid) = config.admin_emails.iter().find(|email| !is_valid_email(email)) {
        return Err(StageLightError::Config(
            format!("Invalid admin email in allow-list: {}", invalid)
        ));
    }

    if config.session_ttl_seconds == 0 {
        return Err(StageLightError::Config(
            "Session TTL must be greater than 0".to_string()
        ));
    }

    if config.refresh_margin_seconds < 0 {
        return Err(StageLightError::Config(
            "Refresh margin cannot be negative".to_string()
        ));
    }

    Ok(())
}

/// Validate HTTP server configuration
fn validate_server_config(config: &super::ServerConfig) -> Result<()> {
    if config.host.is_empty() {
        return Err(StageLightError::Config(
            "Server host is required".to_string()
        ));
    }

    for proxy in &config.trusted_proxies {
        if proxy.trim().parse::<std::net::IpAddr>().is_err() {
            return Err(StageLightError::Config(
                format!("Trusted proxy must be an IP address: {}", proxy)
            ));
        }
    }

    Ok(())
}

/// Validate change feed configuration
fn validate_realtime_config(config: &super::RealtimeConfig) -> Result<()> {
    if config.enabled && config.channel.is_empty() {
        return Err(StageLightError::Config(
            "Realtime channel is required when realtime is enabled".to_string()
        ));
    }

    if config.buffer_size == 0 {
        return Err(StageLightError::Config(
            "Realtime buffer size must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate toast configuration
fn validate_notifications_config(config: &super::NotificationsConfig) -> Result<()> {
    if config.max_queue == 0 {
        return Err(StageLightError::Config(
            "Notification queue must hold at least one entry".to_string()
        ));
    }

    Ok(())
}

/// Validate request limits
fn validate_rate_limit_config(config: &super::RateLimitConfig) -> Result<()> {
    if config.login_per_minute == 0 || config.forms_per_minute == 0 {
        return Err(StageLightError::Config(
            "Rate limits must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(StageLightError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(StageLightError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    Ok(())
}
