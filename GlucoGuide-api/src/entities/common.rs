use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use gluco_guide_domain::services::{AdvisoryServiceError, ReadingServiceError, TargetRangeServiceError};

/// Error response format for the API
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error type/code - machine-readable identifier
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// Create a not found error response
    pub fn not_found(resource: &str) -> Self {
        Self {
            error: "not_found".to_string(),
            message: format!("The requested {} could not be found", resource),
            details: None,
        }
    }

    /// Create a validation error response
    pub fn validation_error(message: &str, details: Option<serde_json::Value>) -> Self {
        Self {
            error: "validation_error".to_string(),
            message: message.to_string(),
            details,
        }
    }

    /// Create a bad request error response
    pub fn bad_request(message: &str) -> Self {
        Self {
            error: "bad_request".to_string(),
            message: message.to_string(),
            details: None,
        }
    }

    /// Stored data or configuration the service could not interpret
    pub fn configuration_error() -> Self {
        Self {
            error: "configuration_error".to_string(),
            message: "Stored data could not be interpreted".to_string(),
            details: None,
        }
    }

    /// Create an internal error response
    pub fn internal_error() -> Self {
        Self {
            error: "internal_error".to_string(),
            message: "An unexpected error occurred".to_string(),
            details: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.error.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "validation_error" | "bad_request" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<ReadingServiceError> for ErrorResponse {
    fn from(err: ReadingServiceError) -> Self {
        match err {
            ReadingServiceError::ValidationError(msg) => ErrorResponse::validation_error(&msg, None),
            ReadingServiceError::NotFound(_) => ErrorResponse::not_found("reading"),
            ReadingServiceError::ConfigurationError(msg) => {
                error!("Reading configuration error: {}", msg);
                ErrorResponse::configuration_error()
            }
            ReadingServiceError::RepositoryError(msg) => {
                error!("Reading repository error: {}", msg);
                ErrorResponse::internal_error()
            }
        }
    }
}

impl From<AdvisoryServiceError> for ErrorResponse {
    fn from(err: AdvisoryServiceError) -> Self {
        match err {
            AdvisoryServiceError::ValidationError(msg) => ErrorResponse::validation_error(&msg, None),
            AdvisoryServiceError::NotFound(_) => ErrorResponse::not_found("advisory"),
            AdvisoryServiceError::ConfigurationError(msg) => {
                error!("Advisory configuration error: {}", msg);
                ErrorResponse::configuration_error()
            }
            AdvisoryServiceError::RepositoryError(msg) => {
                error!("Advisory repository error: {}", msg);
                ErrorResponse::internal_error()
            }
        }
    }
}

impl From<TargetRangeServiceError> for ErrorResponse {
    fn from(err: TargetRangeServiceError) -> Self {
        match err {
            TargetRangeServiceError::ValidationError(msg) => ErrorResponse::validation_error(&msg, None),
            TargetRangeServiceError::ConfigurationError(msg) => {
                error!("Target range configuration error: {}", msg);
                ErrorResponse::configuration_error()
            }
            TargetRangeServiceError::RepositoryError(msg) => {
                error!("Target range repository error: {}", msg);
                ErrorResponse::internal_error()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let validation: ErrorResponse = ReadingServiceError::ValidationError("bad unit".to_string()).into();
        assert_eq!(validation.status(), StatusCode::BAD_REQUEST);
        assert_eq!(validation.message, "bad unit");

        let missing: ErrorResponse = AdvisoryServiceError::NotFound("x".to_string()).into();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let config: ErrorResponse = TargetRangeServiceError::ConfigurationError("unit".to_string()).into();
        assert_eq!(config.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(config.error, "configuration_error");
    }

    #[test]
    fn test_internal_details_are_not_leaked() {
        let response: ErrorResponse = ReadingServiceError::RepositoryError("disk I/O error at /var/db".to_string()).into();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!response.message.contains("/var/db"));
    }
}
