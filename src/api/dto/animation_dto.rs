//! Timeline animation, bone, and roast submission DTOs.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::common_dto::{optional_number, optional_text};

/// Query for `GET /anim/play` and `GET /anim/stop`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AnimationParams {
    /// Animation name, e.g. `nigel_head_shake`. Required.
    #[serde(default, deserialize_with = "optional_text")]
    pub name: Option<String>,
}

/// Response body for `GET /anim/play` and `GET /anim/stop`.
#[derive(Debug, Serialize, ToSchema)]
pub struct AnimationResponse {
    /// Whether the renderer received the command.
    pub sent: bool,
    /// Animation name.
    pub animation: String,
    /// `play` or `stop`.
    pub action: String,
}

/// Response body for `GET /anims`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ListAnimationsResponse {
    /// Whether the renderer received the request.
    pub requested: bool,
    /// Where the list ends up.
    pub note: String,
}

/// Response body for `GET /bones`.
#[derive(Debug, Serialize, ToSchema)]
pub struct BonesResponse {
    /// Whether the renderer received the command.
    pub sent: bool,
    /// Always `bone_edit`.
    pub mode: String,
}

/// Query for `GET /bone`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BoneParams {
    /// Bone name, e.g. `terry_head`. Required.
    #[serde(default, deserialize_with = "optional_text")]
    pub name: Option<String>,
    /// Rotation in degrees; defaults to 0.
    #[serde(default, deserialize_with = "optional_number")]
    pub angle: Option<f64>,
}

/// Response body for `GET /bone`.
#[derive(Debug, Serialize, ToSchema)]
pub struct BoneResponse {
    /// Whether the renderer received the command.
    pub sent: bool,
    /// Bone name.
    pub name: String,
    /// Rotation sent.
    pub angle: f64,
}

/// Form body for `POST /submit`.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitForm {
    /// Person being roasted; defaults to `Unknown`.
    #[serde(default)]
    pub name: Option<String>,
    /// Footage URL.
    #[serde(default)]
    pub video: Option<String>,
    /// Footage URL, alternate field name.
    #[serde(default)]
    pub video_url: Option<String>,
    /// Roasting character; defaults to `terry`.
    #[serde(default)]
    pub character: Option<String>,
}

/// Response body for `POST /submit`.
#[derive(Debug, Serialize, ToSchema)]
pub struct SubmitResponse {
    /// Always `true`.
    pub received: bool,
    /// Whether the renderer received the roast command.
    pub sent: bool,
    /// Person being roasted.
    pub target: String,
}
