//! Error handling for StageLight
//!
//! This module defines the main error types used throughout the application
//! and provides a unified error handling strategy.

use thiserror::Error;
use crate::validation::ValidationErrors;

/// Message returned for every failed sign-in, whatever the underlying cause
pub const ACCESS_DENIED_MESSAGE: &str = "Access denied: invalid credentials or not an administrator";

/// Main error type for StageLight application
#[derive(Error, Debug)]
pub enum StageLightError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{}", ACCESS_DENIED_MESSAGE)]
    AccessDenied,

    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Auth backend error: {0}")]
    Backend(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Realtime error: {0}")]
    Realtime(String),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for StageLight operations
pub type Result<T> = std::result::Result<T, StageLightError>;

impl From<ValidationErrors> for StageLightError {
    fn from(errors: ValidationErrors) -> Self {
        StageLightError::Validation(errors)
    }
}

impl StageLightError {
    /// Shorthand for a missing record
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        StageLightError::NotFound { entity, id: id.to_string() }
    }

    /// Check if the error is recoverable
    ///
    /// Nothing is retried automatically; this only tells the caller whether
    /// re-triggering the same action could succeed.
    pub fn is_recoverable(&self) -> bool {
        match self {
            StageLightError::Database(_) => true,
            StageLightError::Migration(_) => false,
            StageLightError::Config(_) => false,
            StageLightError::AccessDenied => false,
            StageLightError::Unauthenticated => false,
            StageLightError::Backend(_) => true,
            StageLightError::NotFound { .. } => false,
            StageLightError::Validation(_) => false,
            StageLightError::Realtime(_) => true,
            StageLightError::Redis(_) => true,
            StageLightError::Http(_) => true,
            StageLightError::Serialization(_) => false,
            StageLightError::Token(_) => false,
            StageLightError::Io(_) => true,
            StageLightError::UrlParse(_) => false,
            StageLightError::RateLimitExceeded => true,
            StageLightError::InvalidInput(_) => false,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            StageLightError::Migration(_) => ErrorSeverity::Critical,
            StageLightError::Config(_) => ErrorSeverity::Critical,
            StageLightError::AccessDenied => ErrorSeverity::Warning,
            StageLightError::Unauthenticated => ErrorSeverity::Info,
            StageLightError::RateLimitExceeded => ErrorSeverity::Warning,
            StageLightError::Validation(_) => ErrorSeverity::Info,
            StageLightError::InvalidInput(_) => ErrorSeverity::Info,
            StageLightError::NotFound { .. } => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_denied_message_is_generic() {
        let error = StageLightError::AccessDenied;
        assert_eq!(error.to_string(), ACCESS_DENIED_MESSAGE);
        assert!(!error.to_string().contains("password"));
    }

    #[test]
    fn test_severity_and_recoverability() {
        assert_eq!(StageLightError::Config("x".into()).severity(), ErrorSeverity::Critical);
        assert!(!StageLightError::Config("x".into()).is_recoverable());
        assert_eq!(StageLightError::RateLimitExceeded.severity(), ErrorSeverity::Warning);
        assert!(StageLightError::RateLimitExceeded.is_recoverable());
        assert_eq!(StageLightError::not_found("Event", "abc").to_string(), "Event not found: abc");
    }
}
