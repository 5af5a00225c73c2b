//! Relay error types with HTTP status code mapping.
//!
//! [`RelayError`] is the error type of every HTTP handler. Each variant maps
//! to a status code and a small JSON body. A renderer that is not connected
//! is not an error; handlers report it as `"sent": false`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::sequence::reactions::UnknownReaction;

/// JSON error response body.
///
/// ```json
/// { "error": "unknown reaction: moonwalk", "available": ["terry_shocked", "..."] }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
    /// Valid alternatives, when the request named something unknown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available: Option<Vec<String>>,
}

/// Server-side error enum with HTTP status code mapping.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// Missing or wrong control token.
    #[error("unauthorized")]
    Unauthorized,

    /// Request validation failed.
    #[error("{0}")]
    InvalidRequest(String),

    /// A required parameter was absent or empty.
    #[error("{0} required")]
    MissingParameter(&'static str),

    /// No reaction with this name exists.
    #[error(transparent)]
    UnknownReaction(#[from] UnknownReaction),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RelayError {
    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::InvalidRequest(_) | Self::MissingParameter(_) | Self::UnknownReaction(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "request rejected");
        }
        let available = match &self {
            Self::UnknownReaction(_) => Some(
                UnknownReaction::available()
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
            ),
            _ => None,
        };
        let body = ErrorResponse {
            error: self.to_string(),
            available,
        };
        (status, axum::Json(body)).into_response()
    }
}
