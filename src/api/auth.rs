//! Shared-secret authentication for the HTTP control surface.
//!
//! The token may arrive in the `X-WFL-Token` header, the `token` query
//! parameter, or a `token` field of a JSON or form body, in that order of
//! precedence. The first non-empty trimmed value wins. An empty configured
//! token disables the check entirely.

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::header::{CONTENT_TYPE, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;
use serde::Deserialize;

use crate::app_state::AppState;
use crate::error::RelayError;

/// Header carrying the control token.
pub const TOKEN_HEADER: &str = "x-wfl-token";

/// Largest body buffered while looking for a token.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Returns whether `candidate` grants access under `configured`.
///
/// An empty `configured` token authorizes everyone. Comparison is exact.
#[must_use]
pub fn authorize(candidate: &str, configured: &str) -> bool {
    configured.is_empty() || candidate == configured
}

#[derive(Debug, Default, Deserialize)]
struct TokenField {
    #[serde(default)]
    token: Option<String>,
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Token from the `X-WFL-Token` header.
#[must_use]
pub fn header_token(headers: &HeaderMap) -> Option<String> {
    non_empty(headers.get(TOKEN_HEADER).and_then(|v| v.to_str().ok()))
}

/// Token from a raw query string.
#[must_use]
pub fn query_token(query: Option<&str>) -> Option<String> {
    let field: TokenField = serde_urlencoded::from_str(query?).ok()?;
    non_empty(field.token.as_deref())
}

/// Token from a JSON or form-encoded body.
#[must_use]
pub fn body_token(content_type: Option<&str>, body: &[u8]) -> Option<String> {
    if body.is_empty() {
        return None;
    }
    let field: TokenField = match content_type {
        Some(ct) if ct.starts_with("application/json") => serde_json::from_slice(body).ok()?,
        Some(ct) if ct.starts_with("application/x-www-form-urlencoded") => {
            serde_urlencoded::from_bytes(body).ok()?
        }
        _ => return None,
    };
    non_empty(field.token.as_deref())
}

/// Middleware rejecting requests without a valid control token.
///
/// The body is only buffered when neither the header nor the query string
/// carries a token; it is handed on unchanged to the handler.
///
/// # Errors
///
/// Returns [`RelayError::Unauthorized`] when the token is missing or wrong,
/// or [`RelayError::InvalidRequest`] when the body cannot be read.
pub async fn require_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, RelayError> {
    let configured = state.config.control_token.as_str();
    if configured.is_empty() {
        return Ok(next.run(request).await);
    }

    let early = header_token(request.headers()).or_else(|| query_token(request.uri().query()));
    if let Some(token) = early {
        return if authorize(&token, configured) {
            Ok(next.run(request).await)
        } else {
            tracing::debug!(path = %request.uri().path(), "rejected control request");
            Err(RelayError::Unauthorized)
        };
    }

    let (parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| RelayError::InvalidRequest(format!("failed to read body: {e}")))?;
    let content_type = parts
        .headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    let token = body_token(content_type, &bytes).unwrap_or_default();
    if !authorize(&token, configured) {
        tracing::debug!(path = %parts.uri.path(), "rejected control request");
        return Err(RelayError::Unauthorized);
    }

    let request = Request::from_parts(parts, Body::from(bytes));
    Ok(next.run(request).await)
}
