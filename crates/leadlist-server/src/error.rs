//! API error types for the leadlist server.
//!
//! Maps validation and configuration failures to HTTP status codes and
//! JSON error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// API error type for route handlers.
pub enum ApiError {
    /// Bad request (empty keyword, over-limit target count, etc.).
    BadRequest(String),
    /// Requested resource not found.
    NotFound(String),
    /// Missing required configuration or internal failure.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::Internal(msg) => {
                tracing::error!("internal error: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = axum::Json(json!({ "error": message }));
        (status, body).into_response()
    }
}
