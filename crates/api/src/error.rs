//! Admin API errors.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Result alias for admin operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors returned by admin operations, each mapped to an HTTP status.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server's shared secret is empty, too short or a placeholder
    #[error("admin secret not configured")]
    NotConfigured,

    /// The caller's secret is missing or wrong
    #[error("unauthorized")]
    Unauthorized,

    /// The request is malformed
    #[error("{0}")]
    BadRequest(String),

    /// A referenced catalog entry does not exist
    #[error("{0}")]
    NotFound(String),
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(serde_json::json!({"error": self.to_string()})),
        )
            .into_response()
    }
}
