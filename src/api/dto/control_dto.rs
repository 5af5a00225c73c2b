//! Direct control DTOs: per-character inputs, gaze and look.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::common_dto::{optional_number, optional_text};
use crate::sequence::gestures::LookDirection;

/// Query for `GET /{character}/lip`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LipParams {
    /// Mouth shape, `0..=7`. Fractions round; defaults to 0.
    #[serde(default, deserialize_with = "optional_number")]
    pub shape: Option<f64>,
}

/// Response body for `GET /{character}/lip`.
#[derive(Debug, Serialize, ToSchema)]
pub struct LipResponse {
    /// Whether the renderer received the command.
    pub sent: bool,
    /// Shape actually sent.
    pub shape: u8,
}

/// Query for `GET /{character}/head`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HeadParams {
    /// Head angle in degrees, clamped to `[-40, 40]`.
    #[serde(default, deserialize_with = "optional_number")]
    pub angle: Option<f64>,
}

/// Response body for `GET /{character}/head`.
#[derive(Debug, Serialize, ToSchema)]
pub struct HeadResponse {
    /// Whether the renderer received the command.
    pub sent: bool,
    /// Angle actually sent.
    pub angle: f64,
}

/// Query for `GET /{character}/talk`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TalkParams {
    /// `true` or `1` turns talking on; anything else turns it off.
    #[serde(default)]
    pub on: Option<String>,
}

/// Response body for `GET /{character}/talk`.
#[derive(Debug, Serialize, ToSchema)]
pub struct TalkResponse {
    /// Whether the renderer received the command.
    pub sent: bool,
    /// Talking flag sent.
    pub talking: bool,
}

/// Query for `GET /{character}/eyes`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EyesParams {
    /// `open`, `closed`, `half`, `squint`, `wide`, or an index `0..=4`.
    #[serde(default, deserialize_with = "optional_text")]
    pub state: Option<String>,
}

/// Response body for `GET /{character}/eyes`.
#[derive(Debug, Serialize, ToSchema)]
pub struct EyesResponse {
    /// Whether the renderer received the command.
    pub sent: bool,
    /// Name of the eye state sent.
    pub eyes: String,
}

/// Query for `GET /{character}/roast`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RoastLevelParams {
    /// Attitude level: 0 chill, 1 smirk, 2 roast.
    #[serde(default, deserialize_with = "optional_number")]
    pub level: Option<f64>,
}

/// Response body for `GET /{character}/roast`.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoastLevelResponse {
    /// Whether the renderer received the command.
    pub sent: bool,
    /// Level sent.
    pub roast: u8,
}

/// Query for `GET /pupils`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PupilParams {
    /// Horizontal offset, clamped to `[-20, 20]`.
    #[serde(default, deserialize_with = "optional_number")]
    pub x: Option<f64>,
    /// Vertical offset, clamped to `[-10, 10]`.
    #[serde(default, deserialize_with = "optional_number")]
    pub y: Option<f64>,
}

/// Response body for `GET /pupils`.
#[derive(Debug, Serialize, ToSchema)]
pub struct PupilResponse {
    /// Whether the renderer received the command.
    pub sent: bool,
    /// Horizontal offset sent.
    pub x: f64,
    /// Vertical offset sent.
    pub y: f64,
}

/// Query for `GET /look`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LookParams {
    /// Named direction; unknown names look at the center.
    #[serde(default, deserialize_with = "optional_text")]
    pub direction: Option<String>,
}

/// Response body for `GET /look`.
#[derive(Debug, Serialize, ToSchema)]
pub struct LookResponse {
    /// Whether the renderer received the command.
    pub sent: bool,
    /// Direction applied.
    pub direction: LookDirection,
    /// Horizontal offset sent.
    pub x: f64,
    /// Vertical offset sent.
    pub y: f64,
}
