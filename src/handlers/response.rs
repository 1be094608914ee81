//! JSON response envelope
//!
//! Successful responses look like `{success, data, message}`; failures like
//! `{success: false, error: {code, message, details}}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, warn};
use crate::utils::errors::{ErrorSeverity, StageLightError};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T>
where
    T: Serialize,
{
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
    pub details: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct ApiErrorResponse {
    pub success: bool,
    pub error: ApiErrorBody,
}

pub fn success<T>(data: T) -> Response
where
    T: Serialize,
{
    let body = ApiResponse {
        success: true,
        data: Some(data),
        message: None,
    };
    (StatusCode::OK, Json(body)).into_response()
}

pub fn created<T>(data: T, message: impl Into<String>) -> Response
where
    T: Serialize,
{
    let body = ApiResponse {
        success: true,
        data: Some(data),
        message: Some(message.into()),
    };
    (StatusCode::CREATED, Json(body)).into_response()
}

pub fn success_with_message<T>(data: T, message: impl Into<String>) -> Response
where
    T: Serialize,
{
    let body = ApiResponse {
        success: true,
        data: Some(data),
        message: Some(message.into()),
    };
    (StatusCode::OK, Json(body)).into_response()
}

pub fn empty_success(message: impl Into<String>) -> Response {
    let body: ApiResponse<()> = ApiResponse {
        success: true,
        data: None,
        message: Some(message.into()),
    };
    (StatusCode::OK, Json(body)).into_response()
}

pub fn error(code: &str, message: impl Into<String>, details: Option<Value>, status: StatusCode) -> Response {
    let body = ApiErrorResponse {
        success: false,
        error: ApiErrorBody {
            code: code.to_string(),
            message: message.into(),
            details,
        },
    };

    (status, Json(body)).into_response()
}

/// 401 telling the browser where to sign in
pub fn unauthenticated(redirect: &str) -> Response {
    error(
        "UNAUTHENTICATED",
        "Please sign in to continue",
        Some(json!({ "redirect": redirect })),
        StatusCode::UNAUTHORIZED,
    )
}

impl StageLightError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            StageLightError::Validation(_) | StageLightError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            StageLightError::Unauthenticated => StatusCode::UNAUTHORIZED,
            StageLightError::AccessDenied => StatusCode::FORBIDDEN,
            StageLightError::NotFound { .. } => StatusCode::NOT_FOUND,
            StageLightError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            StageLightError::Backend(_) | StageLightError::Http(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            StageLightError::Validation(_) => "VALIDATION_ERROR",
            StageLightError::InvalidInput(_) => "INVALID_INPUT",
            StageLightError::Unauthenticated => "UNAUTHENTICATED",
            StageLightError::AccessDenied => "ACCESS_DENIED",
            StageLightError::NotFound { .. } => "NOT_FOUND",
            StageLightError::RateLimitExceeded => "RATE_LIMITED",
            StageLightError::Backend(_) | StageLightError::Http(_) => "BACKEND_ERROR",
            StageLightError::Database(_) | StageLightError::Migration(_) => "DATABASE_ERROR",
            _ => "INTERNAL_SERVER_ERROR",
        }
    }

    fn public_message(&self) -> String {
        match self {
            StageLightError::Validation(_) => "Please correct the highlighted fields".to_string(),
            StageLightError::Database(_) | StageLightError::Migration(_) => {
                "A database error occurred".to_string()
            }
            StageLightError::Backend(_) | StageLightError::Http(_) => {
                "The backend is currently unavailable".to_string()
            }
            StageLightError::Redis(_)
            | StageLightError::Serialization(_)
            | StageLightError::Token(_)
            | StageLightError::Io(_)
            | StageLightError::Config(_)
            | StageLightError::Realtime(_)
            | StageLightError::UrlParse(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for StageLightError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match self.severity() {
            ErrorSeverity::Error | ErrorSeverity::Critical => error!(error = %self, "Request failed"),
            ErrorSeverity::Warning => warn!(error = %self, "Request rejected"),
            ErrorSeverity::Info => {}
        }

        let details = match &self {
            StageLightError::Validation(errors) => serde_json::to_value(errors).ok(),
            _ => None,
        };

        error(self.code(), self.public_message(), details, status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationErrors;

    #[test]
    fn test_status_mapping() {
        let mut errors = ValidationErrors::new();
        errors.add("title", "Title is required");

        assert_eq!(StageLightError::Validation(errors).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(StageLightError::AccessDenied.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(StageLightError::Unauthenticated.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(StageLightError::not_found("Event", "x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(StageLightError::RateLimitExceeded.status_code(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            StageLightError::Config("x".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let error = StageLightError::Config("database password is hunter2".to_string());
        assert_eq!(error.public_message(), "Internal server error");
    }
}
