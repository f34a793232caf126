//! Error types for web handlers.
//!
//! This module bridges between the lifecycle core's domain errors and
//! HTTP responses, implementing Axum's `IntoResponse` trait.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use janseva_core::error::LifecycleError;
use serde::Serialize;
use std::fmt;

/// Application error type for web handlers.
///
/// Wraps domain errors and provides HTTP-friendly error responses. It
/// implements Axum's `IntoResponse` trait to automatically convert
/// errors into HTTP responses.
///
/// # Examples
///
/// ```ignore
/// async fn handler() -> Result<Json<Data>, AppError> {
///     let record = state.lifecycle.get_application(&ctx, id).await?;
///     Ok(Json(record))
/// }
/// ```
#[derive(Debug)]
pub struct AppError {
    /// HTTP status code
    status: StatusCode,
    /// Error message (user-facing)
    message: String,
    /// Error code (for client error handling)
    code: String,
    /// Internal error (for logging, not exposed to client)
    #[allow(dead_code)]
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub const fn new(status: StatusCode, message: String, code: String) -> Self {
        Self {
            status,
            message,
            code,
            source: None,
        }
    }

    /// Create a new error with a source error.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// Create a 400 Bad Request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            message.into(),
            "BAD_REQUEST".to_string(),
        )
    }

    /// Create a 401 Unauthorized error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            message.into(),
            "UNAUTHORIZED".to_string(),
        )
    }

    /// Create a 403 Forbidden error.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::FORBIDDEN,
            message.into(),
            "FORBIDDEN".to_string(),
        )
    }

    /// Create a 404 Not Found error.
    #[must_use]
    pub fn not_found(resource: impl fmt::Display, id: impl fmt::Display) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            format!("{resource} with id {id} not found"),
            "NOT_FOUND".to_string(),
        )
    }

    /// Create a 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            message.into(),
            "INTERNAL_SERVER_ERROR".to_string(),
        )
    }

    /// The HTTP status this error maps to.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// The machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Maps every domain error to its HTTP status, preserving the domain
/// error code so clients can branch without parsing messages.
impl From<LifecycleError> for AppError {
    fn from(err: LifecycleError) -> Self {
        let status = match &err {
            LifecycleError::Validation { .. } => StatusCode::BAD_REQUEST,
            LifecycleError::NotFound { .. } => StatusCode::NOT_FOUND,
            LifecycleError::Forbidden { .. } => StatusCode::FORBIDDEN,
            LifecycleError::IllegalTransition { .. } | LifecycleError::Conflict { .. } => {
                StatusCode::CONFLICT
            }
            LifecycleError::Dependency { .. } => StatusCode::SERVICE_UNAVAILABLE,
        };
        Self::new(status, err.to_string(), err.code().to_string())
    }
}

/// Error response body (JSON).
#[derive(Debug, Serialize)]
struct ErrorResponse {
    /// Error code (for client error handling).
    code: String,
    /// Human-readable error message.
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log internal errors
        if self.status.is_server_error() {
            if let Some(source) = &self.source {
                tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    error = %source,
                    "Internal server error"
                );
            } else {
                tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    "Internal server error"
                );
            }
        }

        let body = ErrorResponse {
            code: self.code,
            message: self.message,
        };

        (self.status, Json(body)).into_response()
    }
}

/// Convert `anyhow::Error` to `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal("An internal error occurred").with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use janseva_core::ApplicationStatus;

    #[test]
    fn test_error_display() {
        let err = AppError::bad_request("Invalid input");
        assert_eq!(err.to_string(), "[BAD_REQUEST] Invalid input");
    }

    #[test]
    fn test_not_found() {
        let err = AppError::not_found("Application", "123");
        assert_eq!(
            err.to_string(),
            "[NOT_FOUND] Application with id 123 not found"
        );
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_domain_error_status_mapping() {
        let cases = [
            (
                LifecycleError::validation("bad phone"),
                StatusCode::BAD_REQUEST,
            ),
            (
                LifecycleError::not_found("application", "abc"),
                StatusCode::NOT_FOUND,
            ),
            (LifecycleError::forbidden("nope"), StatusCode::FORBIDDEN),
            (
                LifecycleError::IllegalTransition {
                    from: ApplicationStatus::Approved,
                    to: ApplicationStatus::Pending,
                },
                StatusCode::CONFLICT,
            ),
            (
                LifecycleError::Conflict {
                    message: "lost race".to_string(),
                },
                StatusCode::CONFLICT,
            ),
            (
                LifecycleError::dependency("store down"),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];
        for (domain, expected) in cases {
            let err = AppError::from(domain);
            assert_eq!(err.status(), expected);
        }
    }

    #[test]
    fn test_domain_error_codes_survive_conversion() {
        let err = AppError::from(LifecycleError::validation("bad phone"));
        assert_eq!(err.code(), "VALIDATION_ERROR");
        let err = AppError::from(LifecycleError::Conflict {
            message: "lost race".to_string(),
        });
        assert_eq!(err.code(), "CONFLICT");
    }
}
