//! Error types for kiosk-player
//!
//! The playback engine itself never fails; errors come from configuration,
//! the resume store and request handling.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use kiosk_common::ResumeError;
use serde::Serialize;
use thiserror::Error;

/// Main error type for kiosk-player
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Resume store errors
    #[error("Resume store error: {0}")]
    Resume(#[from] ResumeError),

    /// Malformed request parameters
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Other errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience Result type using kiosk-player Error
pub type Result<T> = std::result::Result<T, Error>;

/// Error body returned by the HTTP API
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

impl Error {
    /// HTTP status code reported for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) | Error::Resume(ResumeError::NotFound(_)) => StatusCode::NOT_FOUND,
            Error::Resume(e) if e.is_retryable() => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        (
            status,
            Json(StatusResponse {
                status: format!("error: {}", self),
            }),
        )
            .into_response()
    }
}
