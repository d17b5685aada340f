//! User-facing error taxonomy for event searches

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Errors surfaced to callers of the event search
#[derive(Debug, thiserror::Error)]
pub enum EventSearchError {
    /// Malformed request parameters
    #[error("{message}")]
    InvalidRequest { message: String },
    /// The search or scrape provider failed as a whole
    #[error("{message}")]
    UpstreamUnavailable { message: String },
}

impl EventSearchError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    pub fn upstream_unavailable(message: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            message: message.into(),
        }
    }

    /// Stable machine-checkable category
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidRequest { .. } => "invalid_request",
            Self::UpstreamUnavailable { .. } => "upstream_unavailable",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            Self::UpstreamUnavailable { .. } => StatusCode::BAD_GATEWAY,
        }
    }
}

/// JSON body of an error response
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

impl IntoResponse for EventSearchError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.code(),
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
