use axum::{http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

/// Error body returned by every failing endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl ErrorBody {
    pub fn new(detail: impl Into<String>) -> Self {
        Self { detail: detail.into() }
    }
}

pub type ApiErrorResponse = (StatusCode, Json<ErrorBody>);

/// Centralized error types for consistent API error handling
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Error context for structured logging
#[derive(Debug)]
pub struct ErrorContext {
    pub operation: String,
    pub resource_type: String,
    pub user_friendly_message: Option<String>,
}

impl ErrorContext {
    pub fn new(operation: &str, resource_type: &str) -> Self {
        Self {
            operation: operation.to_string(),
            resource_type: resource_type.to_string(),
            user_friendly_message: None,
        }
    }

    pub fn with_user_message(mut self, message: &str) -> Self {
        self.user_friendly_message = Some(message.to_string());
        self
    }
}

impl ApiError {
    /// Convert API error to HTTP response with consistent structure and logging
    pub fn to_response_with_context(self, context: ErrorContext) -> ApiErrorResponse {
        match &self {
            ApiError::ValidationError(message) | ApiError::BadRequest(message) => {
                warn!(
                    operation = %context.operation,
                    resource_type = %context.resource_type,
                    error = %self,
                    "Rejected request"
                );
                (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorBody::new(
                        context.user_friendly_message.unwrap_or_else(|| message.clone()),
                    )),
                )
            }
            ApiError::GenerationFailed(_) => {
                error!(
                    operation = %context.operation,
                    resource_type = %context.resource_type,
                    error = %self,
                    "Generation failed"
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody::new(
                        context
                            .user_friendly_message
                            .unwrap_or_else(|| format!("Failed to generate {}", context.resource_type)),
                    )),
                )
            }
            ApiError::InternalError(_) => {
                error!(
                    operation = %context.operation,
                    resource_type = %context.resource_type,
                    error = %self,
                    "Internal server error"
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody::new("Internal server error")),
                )
            }
        }
    }

    /// Simple conversion without context
    pub fn to_response(self) -> ApiErrorResponse {
        self.to_response_with_context(ErrorContext::new("unknown", "resource"))
    }
}

/// Helper macro for structured error responses
#[macro_export]
macro_rules! api_error {
    (validation, $operation:expr, $resource_type:expr, $message:expr) => {
        $crate::errors::ApiError::ValidationError($message.to_string())
            .to_response_with_context($crate::errors::ErrorContext::new($operation, $resource_type))
    };

    (bad_request, $operation:expr, $resource_type:expr, $message:expr) => {
        $crate::errors::ApiError::BadRequest($message.to_string())
            .to_response_with_context($crate::errors::ErrorContext::new($operation, $resource_type))
    };

    (generation, $operation:expr, $resource_type:expr, $message:expr) => {
        $crate::errors::ApiError::GenerationFailed($message.to_string())
            .to_response_with_context($crate::errors::ErrorContext::new($operation, $resource_type))
    };
}
