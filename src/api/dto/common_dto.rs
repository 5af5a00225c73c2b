//! Shared DTO types and query-string helpers used across endpoints.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::domain::ControlState;

/// Deserializes an optional number from a query string.
///
/// An absent or blank value is `None`; anything else must parse as `f64`.
pub(crate) fn optional_number<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<f64>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<f64>()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("not a number: {value}"))),
    }
}

/// Deserializes an optional string, treating blank values as absent.
pub(crate) fn optional_text<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty()))
}

/// Interprets a `true`/`1` style flag. Anything else is `false`.
#[must_use]
pub fn truthy(value: Option<&str>) -> bool {
    matches!(value.map(str::trim), Some("true" | "1"))
}

/// Acknowledgment for endpoints that only report delivery.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SentResponse {
    /// Whether the renderer received the command.
    pub sent: bool,
}

/// Acknowledgment for awaited sequences.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DoneResponse {
    /// Always `true` once the sequence has ended.
    pub done: bool,
}

/// Response body for `GET /reset`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ResetResponse {
    /// Always `true`.
    pub reset: bool,
    /// Mirrored state after the reset.
    pub state: ControlState,
}

/// Response body for `GET /status`.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    /// Whether a renderer is connected.
    pub flutter: bool,
    /// Number of observer connections.
    pub web_clients: usize,
    /// Mirrored control state.
    pub state: ControlState,
    /// Names of running sequences.
    pub sequences: Vec<String>,
}
