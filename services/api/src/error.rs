//! Custom error types for the API service

use axum::{
    Json,
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::error::ProxyError;
use serde_json::json;
use thiserror::Error;

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Bad request with message
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Requested upstream resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Upstream failure with no fallback left
    #[error("Upstream failure: {0}")]
    Upstream(String),
}

impl From<ProxyError> for ApiError {
    fn from(err: ProxyError) -> Self {
        match err {
            ProxyError::MissingUrl => ApiError::BadRequest("Media URL is required.".to_string()),
            ProxyError::InvalidUrl(_) => {
                ApiError::BadRequest("Media URL must be an absolute http(s) URL.".to_string())
            }
            ProxyError::NotFound { .. } => ApiError::NotFound(
                "Media not found at origin (invalid URL or resource removed).".to_string(),
            ),
            ProxyError::UpstreamStatus { .. }
            | ProxyError::Request(_)
            | ProxyError::Stream(_) => {
                ApiError::Upstream("Internal server error while proxying media.".to_string())
            }
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Upstream(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(json!({
            "message": message,
        }));

        (status, body).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
