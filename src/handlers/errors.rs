use axum::{http::StatusCode, response::Json};
use serde_json::{json, Value};

use crate::models::{RepositoryError, ServiceError};

/// Error half of every handler result
pub type ApiError = (StatusCode, Json<Value>);

pub type ApiResult<T> = Result<T, ApiError>;

/// JSON error body shared by all endpoints
pub fn error_response(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(json!({
            "error": message.into(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        })),
    )
}

/// Convert service errors to HTTP responses
pub fn service_error_to_response(err: ServiceError) -> ApiError {
    let (status, message) = match err {
        ServiceError::ProductNotFound { .. }
        | ServiceError::OrderNotFound { .. }
        | ServiceError::BookingNotFound { .. }
        | ServiceError::PaymentNotFound { .. }
        | ServiceError::CartNotFound { .. }
        | ServiceError::CartItemNotFound { .. } => (StatusCode::NOT_FOUND, err.to_string()),
        ServiceError::ValidationError { message } => (StatusCode::BAD_REQUEST, message),
        ServiceError::EmptyCart { .. }
        | ServiceError::PaymentRejected { .. }
        | ServiceError::InvalidQuantity { .. } => (StatusCode::BAD_REQUEST, err.to_string()),
        ServiceError::AuthenticationRequired => (StatusCode::UNAUTHORIZED, err.to_string()),
        ServiceError::InsufficientStock { .. }
        | ServiceError::ProductUnavailable { .. }
        | ServiceError::InvalidStatusTransition { .. } => (StatusCode::CONFLICT, err.to_string()),
        ServiceError::Repository { source } => match source {
            RepositoryError::NotFound => (StatusCode::NOT_FOUND, "Resource not found".to_string()),
            RepositoryError::AlreadyExists { .. } | RepositoryError::StockShortfall { .. } => {
                (StatusCode::CONFLICT, source.to_string())
            }
            RepositoryError::ConstraintViolation { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        },
        ServiceError::Configuration { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Configuration error".to_string(),
        ),
    };

    error_response(status, message)
}
