// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Map, Value};

use crate::store::StoreError;

/// HTTP API error with appropriate status codes and client-visible payloads.
///
/// `to_json` produces the raw framework-style error shapes (`detail`
/// strings, per-field error mappings, `non_field_errors` lists); the
/// response middleware is what flattens these into the `{status, message}`
/// envelope clients actually see.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    Validation { errors: Map<String, Value> },

    // 404 Not Found
    NotFound(String),

    // 500 Internal Server Error
    Internal(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::Validation { .. } => 400,
            ApiError::NotFound(_) => 404,
            ApiError::Internal(_) => 500,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Convert to the pre-normalization JSON response body
    pub fn to_json(&self) -> Value {
        match self {
            ApiError::BadRequest(msg) => json!({ "detail": msg }),
            ApiError::Validation { errors } => Value::Object(errors.clone()),
            ApiError::NotFound(msg) => json!({ "detail": msg }),
            ApiError::Internal(_) => {
                json!({ "detail": "An error occurred while processing your request" })
            }
            ApiError::ServiceUnavailable(msg) => json!({ "detail": msg }),
        }
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation(errors: Map<String, Value>) -> Self {
        ApiError::Validation { errors }
    }

    /// A validation failure that is not tied to any one field
    pub fn non_field_error(message: impl Into<String>) -> Self {
        let mut errors = Map::new();
        errors.insert(
            "non_field_errors".to_string(),
            Value::Array(vec![Value::String(message.into())]),
        );
        ApiError::Validation { errors }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => ApiError::not_found(format!("Question {} not found", id)),
            StoreError::DuplicateText => ApiError::non_field_error("Question already exists"),
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::NotFound(msg)
            | ApiError::Internal(msg)
            | ApiError::ServiceUnavailable(msg) => write!(f, "{}", msg),
            ApiError::Validation { errors } => {
                write!(f, "validation failed: {}", Value::Object(errors.clone()))
            }
        }
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        if let ApiError::Internal(detail) = &self {
            // Log the real error but return a generic client message
            tracing::error!("internal error: {}", detail);
        }
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}
