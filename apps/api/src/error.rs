//! Error types for the Back Office API.
//!
//! Every failure is logged with its full operation chain and answered with
//! the same opaque body; clients cannot tell causes apart.
//!
//! ```text
//! DbError (create_receipt: insert receipt line 2: ...) ─┐
//! malformed JSON body / path segment ───────────────────┼─► error! log ─► 500
//!                                                       │   "500 Internal Server Error"
//! ```

use axum::extract::rejection::PathRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use backoffice_db::DbError;
use tracing::error;

/// Body of every failed request.
pub const INTERNAL_ERROR_BODY: &str = "500 Internal Server Error";

/// Body of unmatched routes and methods.
pub const NOT_FOUND_BODY: &str = "404 Not Found";

/// API errors.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] DbError),

    /// The request body or a path segment could not be decoded.
    #[error("Malformed request: {0}")]
    Decode(String),
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Decode(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Store(err) => error!(error = %err, "Store operation failed"),
            ApiError::Decode(reason) => error!(reason = %reason, "Request could not be decoded"),
        }

        (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_BODY).into_response()
    }
}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;
