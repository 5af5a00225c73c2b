//! Admin DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Form body for `POST /admin/rive-url`.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RiveUrlForm {
    /// Remote `.riv` URL; blank switches back to the bundled file.
    #[serde(default)]
    pub url: Option<String>,
}

/// Response body for `POST /admin/rive-url`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RiveUrlResponse {
    /// Whether the renderer received the command.
    pub sent: bool,
    /// URL now configured, `null` for the bundled file.
    pub rive_url: Option<String>,
}

/// Response body for `GET /admin/reload-rive`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReloadResponse {
    /// Whether the renderer received the command.
    pub sent: bool,
    /// Human-readable outcome.
    pub message: String,
}
