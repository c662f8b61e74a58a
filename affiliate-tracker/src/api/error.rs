//! API error handling.
//!
//! Every failure leaves a handler as an [`ApiError`], rendered as the uniform
//! envelope `{success: false, error}` or `{success: false, errors: [...]}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

use super::auth_service::AuthError;
use super::resource_service::ResourceError;
use super::validation::FieldViolation;
use crate::error::Error;

/// Generic body for storage and unexpected failures.
pub const SERVER_ERROR: &str = "Server error";

/// API error response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiErrorResponse {
    /// Always `false`
    pub success: bool,
    /// Human-readable error message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Per-field validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldViolation>>,
}

/// API error type that can be converted to HTTP responses.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub violations: Option<Vec<FieldViolation>>,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            violations: None,
        }
    }

    /// Create a 400 error carrying field violations.
    pub fn validation(violations: Vec<FieldViolation>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: "Validation failed".to_string(),
            violations: Some(violations),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn too_many_requests() -> Self {
        Self::new(
            StatusCode::TOO_MANY_REQUESTS,
            "Too many requests, please try again later",
        )
    }

    /// Create a 500 error with the generic body.
    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }

    fn body(self) -> (StatusCode, ApiErrorResponse) {
        let body = match self.violations {
            Some(violations) => ApiErrorResponse {
                success: false,
                error: None,
                errors: Some(violations),
            },
            None => ApiErrorResponse {
                success: false,
                error: Some(self.message),
                errors: None,
            },
        };
        (self.status, body)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.body();
        (status, Json(body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Validation(violations) => ApiError::validation(violations),
            AuthError::DuplicateEmail => ApiError::bad_request("Email already registered"),
            AuthError::InvalidCredentials => ApiError::bad_request("Invalid credentials"),
            AuthError::MissingToken => ApiError::unauthorized("Access denied. No token provided"),
            AuthError::InvalidToken => ApiError::bad_request("Invalid token"),
            AuthError::TokenExpired => ApiError::bad_request("Token has expired"),
            AuthError::Storage(msg) | AuthError::Internal(msg) => {
                tracing::error!(error = %msg, "Auth operation failed");
                ApiError::internal()
            }
        }
    }
}

impl From<ResourceError> for ApiError {
    fn from(err: ResourceError) -> Self {
        match err {
            ResourceError::Validation(violations) => ApiError::validation(violations),
            ResourceError::NotFound { entity, .. } => {
                ApiError::not_found(format!("{entity} not found"))
            }
            ResourceError::Storage(msg) => {
                tracing::error!(error = %msg, "Resource operation failed");
                ApiError::internal()
            }
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::NotFound { entity_type, .. } => {
                ApiError::not_found(format!("{entity_type} not found"))
            }
            Error::Validation(msg) => ApiError::bad_request(msg),
            other => {
                tracing::error!(error = %other, "Unexpected error");
                ApiError::internal()
            }
        }
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;
