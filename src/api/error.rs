//! API error handling.
//!
//! Every failure leaves the API as a JSON `{"code", "message"}` body with a
//! status chosen from the error kind.

use axum::{
    extract::rejection::{FormRejection, JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorKind};

/// Error body returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ApiError {
    /// Creates a new API error.
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self { code: code.into(), message: message.into() }
    }
}

/// API error response containing status code and error details.
#[derive(Debug, Clone)]
pub struct ApiErrorResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Error details.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// Creates a new API error response.
    #[must_use]
    pub const fn new(status: StatusCode, error: ApiError) -> Self {
        Self { status, error }
    }

    /// Creates a 400 Bad Request response.
    #[must_use]
    pub fn bad_request(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ApiError::new(code, message))
    }

    /// Creates a 400 response for a malformed task id.
    #[must_use]
    pub fn invalid_id(message: impl Into<String>) -> Self {
        Self::bad_request("INVALID_ID", message)
    }

    /// Creates a 400 response for an unreadable request body.
    #[must_use]
    pub fn invalid_body(message: impl Into<String>) -> Self {
        Self::bad_request("INVALID_BODY", message)
    }

    /// Creates a 404 Not Found response.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", message))
    }

    /// Creates a 409 Conflict response.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, ApiError::new("CONFLICT", message))
    }

    /// Creates a 500 Internal Server Error response.
    #[must_use]
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, ApiError::new("INTERNAL_ERROR", message))
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<Error> for ApiErrorResponse {
    fn from(error: Error) -> Self {
        match error.kind() {
            ErrorKind::Validation => Self::bad_request("VALIDATION_ERROR", error.to_string()),
            ErrorKind::NotFound => Self::not_found(error.to_string()),
            ErrorKind::Conflict => Self::conflict(error.to_string()),
            ErrorKind::Storage => {
                // Details stay in the log.
                tracing::error!(%error, "internal error");
                Self::internal_error("An internal error occurred")
            }
        }
    }
}

impl From<JsonRejection> for ApiErrorResponse {
    fn from(rejection: JsonRejection) -> Self {
        Self::invalid_body(rejection.body_text())
    }
}

impl From<FormRejection> for ApiErrorResponse {
    fn from(rejection: FormRejection) -> Self {
        Self::invalid_body(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiErrorResponse {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request("VALIDATION_ERROR", rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_validation_maps_to_400() {
        let response = ApiErrorResponse::from(Error::validation("title is required"));
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.error.code, "VALIDATION_ERROR");
        assert!(response.error.message.contains("title is required"));
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let id = Uuid::new_v4();
        let response = ApiErrorResponse::from(Error::NotFound(id));
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.error.code, "NOT_FOUND");
        assert!(response.error.message.contains(&id.to_string()));
    }

    #[test]
    fn test_conflict_maps_to_409() {
        let response = ApiErrorResponse::from(Error::Conflict(Uuid::new_v4()));
        assert_eq!(response.status, StatusCode::CONFLICT);
        assert_eq!(response.error.code, "CONFLICT");
    }

    #[test]
    fn test_storage_errors_hide_details() {
        let response = ApiErrorResponse::from(Error::Storage("disk on fire at /var/db".into()));
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.error.code, "INTERNAL_ERROR");
        assert!(!response.error.message.contains("/var/db"));
    }

    #[test]
    fn test_error_body_shape() {
        let error = ApiError::new("INVALID_ID", "invalid task id: 'abc'");
        let json = serde_json::to_value(&error).unwrap();
        assert_eq!(json, serde_json::json!({"code": "INVALID_ID", "message": "invalid task id: 'abc'"}));
    }
}
