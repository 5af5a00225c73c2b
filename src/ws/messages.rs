//! Inbound WebSocket message types.
//!
//! Clients identify themselves with their first message:
//!
//! ```json
//! { "type": "status", "riveLoaded": true }   // the renderer
//! { "type": "web-hello" }                    // an observer page
//! { "type": "ping" }                         // keepalive, answered with pong
//! ```

use serde::{Deserialize, Deserializer};

/// Reply to an application-level ping.
pub const PONG: &str = r#"{"type":"pong"}"#;

/// A message received from a client.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum InboundMessage {
    /// Renderer status report. Carrying `riveLoaded` (any value, even
    /// `null`) identifies the sender as the renderer.
    #[serde(rename = "status")]
    Status {
        /// The `riveLoaded` field, if present.
        #[serde(rename = "riveLoaded", default, deserialize_with = "present")]
        rive_loaded: Option<serde_json::Value>,
    },
    /// Observer greeting.
    #[serde(rename = "web-hello")]
    WebHello,
    /// Application-level keepalive.
    #[serde(rename = "ping")]
    Ping,
    /// Any other well-formed message type.
    #[serde(other)]
    Unknown,
}

impl InboundMessage {
    /// Parses a text frame.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if the frame is not a JSON object
    /// with a string `type` field.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Returns `true` if this message identifies its sender as the renderer.
    #[must_use]
    pub const fn identifies_renderer(&self) -> bool {
        matches!(self, Self::Status { rive_loaded: Some(_) })
    }
}

/// Wraps any present value, `null` included, in `Some`.
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error> {
    serde_json::Value::deserialize(deserializer).map(Some)
}

/// Shortens a raw frame for log output.
#[must_use]
pub fn preview(text: &str) -> &str {
    text.char_indices()
        .nth(100)
        .and_then(|(end, _)| text.get(..end))
        .unwrap_or(text)
}
