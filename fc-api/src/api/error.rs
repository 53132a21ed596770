//! Mapping of core errors onto HTTP responses
//!
//! Every error body has the shape `{"error": <kind>, "message": <text>}`.
//! Server-side failures are logged in full but reported with a generic
//! message so store internals never reach the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use fc_common::Error;
use serde_json::json;
use tracing::error;

/// API errors
#[derive(Debug)]
pub enum ApiError {
    /// Failure reported by the allocator, updater or store
    Core(Error),
    /// Request body could not be read as a JSON object
    BadRequest(String),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError::Core(err)
    }
}

impl ApiError {
    /// HTTP status and machine-readable kind
    pub fn classify(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::Core(err) => match err {
                Error::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
                Error::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
                Error::AllocationExhausted { .. } => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "allocation_exhausted")
                }
                Error::Timeout(_) => (StatusCode::INTERNAL_SERVER_ERROR, "timeout"),
                Error::Database(_)
                | Error::Io(_)
                | Error::Config(_)
                | Error::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind) = self.classify();

        let message = match &self {
            ApiError::BadRequest(msg) => msg.clone(),
            ApiError::Core(err) if status.is_server_error() => {
                error!(error = %err, kind, "Request failed");
                "Internal server error".to_string()
            }
            ApiError::Core(err) => err.to_string(),
        };

        let body = Json(json!({
            "error": kind,
            "message": message,
        }));

        (status, body).into_response()
    }
}
