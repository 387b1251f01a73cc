//! Error types for the busline backend

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Result type alias for busline operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Error taxonomy for the HTTP surface.
///
/// The 400-class variants carry a caller-facing message. The 500-class
/// variants carry internal detail that is logged and never serialized into
/// a response body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    // One message for both the unknown-username and wrong-password cases so
    // the response does not leak which one occurred.
    #[error("Invalid username or password")]
    Auth,

    #[error("Database unreachable: {0}")]
    Connection(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<mongodb::error::Error> for ApiError {
    fn from(err: mongodb::error::Error) -> Self {
        ApiError::Database(err.to_string())
    }
}

/// API error response body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ApiError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Conflict(_) | ApiError::Auth => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Connection(_) | ApiError::Database(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = if status.is_server_error() {
            // Internal detail goes to the log, the caller gets a generic body.
            tracing::error!("request failed: {}", self);
            "Server Error".to_string()
        } else {
            self.to_string()
        };

        (status, axum::Json(ErrorBody { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_are_bad_request() {
        assert_eq!(
            ApiError::Validation("username is required".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Conflict("Username already exists".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::Auth.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_server_errors_are_internal() {
        assert_eq!(
            ApiError::Connection("no reachable servers".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Database("cursor error".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Internal("hashing failed".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_auth_message_is_fixed() {
        // Unknown username and wrong password must render identically.
        assert_eq!(ApiError::Auth.to_string(), "Invalid username or password");
    }
}
