//! Error types for the cache and proxy
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Error Enum ==
/// Unified error type for pokecache.
///
/// The cache's own `add`/`get` never produce one of these; they come from
/// construction, shutdown, configuration and the upstream fetch path.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration value out of range (zero TTL, zero interval, ...)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Cache constructed outside of a Tokio runtime
    #[error("No Tokio runtime available to run the reaper")]
    NoRuntime,

    /// Reaper task panicked or was cancelled
    #[error("Reaper task failed: {0}")]
    ReaperFailed(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Upstream request could not be completed
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Upstream answered with a non-success status
    #[error("Upstream returned status {0}")]
    UpstreamStatus(u16),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Error::UpstreamStatus(status.as_u16()),
            None => Error::Upstream(err.to_string()),
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Error::UpstreamStatus(404) => StatusCode::NOT_FOUND,
            Error::Upstream(_) | Error::UpstreamStatus(_) => StatusCode::BAD_GATEWAY,
            Error::InvalidConfig(_) | Error::NoRuntime | Error::ReaperFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for pokecache.
pub type Result<T> = std::result::Result<T, Error>;
