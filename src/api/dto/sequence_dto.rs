//! Sequence DTOs: speech, gestures, reactions, lip-sync, roast, idle.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::common_dto::{optional_number, optional_text};
use crate::domain::Character;
use crate::sequence::lipsync::Cue;
use crate::sequence::roast::Beat;

/// Query for `GET /speak`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SpeakParams {
    /// Speaking character; defaults to `terry`.
    #[serde(default, deserialize_with = "optional_text")]
    pub character: Option<String>,
    /// Text to flap the mouth to.
    #[serde(default)]
    pub text: Option<String>,
}

/// Response body for `GET /speak`.
#[derive(Debug, Serialize, ToSchema)]
pub struct SpeakResponse {
    /// `true` when every letter was played.
    pub done: bool,
    /// Number of letters played.
    pub phonemes: usize,
}

/// Query for `GET /shake`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ShakeParams {
    /// Shaking character; defaults to `terry`.
    #[serde(default, deserialize_with = "optional_text")]
    pub character: Option<String>,
    /// Amplitude in degrees; defaults to 20.
    #[serde(default, deserialize_with = "optional_number")]
    pub intensity: Option<f64>,
}

/// Query for `GET /nod`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NodParams {
    /// Accepted for symmetry; the nod moves the shared gaze.
    #[serde(default, deserialize_with = "optional_text")]
    pub character: Option<String>,
}

/// Query for `GET /react`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReactParams {
    /// Reaction name, e.g. `terry_laugh`.
    #[serde(default, deserialize_with = "optional_text")]
    pub name: Option<String>,
}

/// Response body for endpoints that start a background sequence.
#[derive(Debug, Serialize, ToSchema)]
pub struct StartedResponse {
    /// Always `true`.
    pub started: bool,
    /// Name the sequence runs under.
    pub sequence: String,
    /// What was started (reaction name, cue count, line count).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Whether a renderer is connected to see it.
    pub flutter: bool,
}

/// Request body for `POST /lipsync`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LipsyncRequest {
    /// Speaking character; defaults to `terry`.
    #[serde(default)]
    pub character: Character,
    /// Timed phonemes, in playback order.
    pub cues: Vec<Cue>,
}

/// Optional request body for `GET|POST /roast/run`.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RoastRunRequest {
    /// Lines Terry delivers; the built-in lines are used when absent.
    #[serde(default)]
    pub lines: Option<Vec<String>>,
    /// Beat closing Nigel's reaction; defaults to `disgust`.
    #[serde(default)]
    pub closing: Option<Beat>,
}

/// Query for `GET /idle/stop`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct IdleStopParams {
    /// `true` or `1` fires the neutral reset burst after stopping.
    #[serde(default)]
    pub reset: Option<String>,
}

/// Query for `GET /sequences/stop`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SequenceStopParams {
    /// Sequence to stop; all sequences when absent.
    #[serde(default, deserialize_with = "optional_text")]
    pub name: Option<String>,
    /// `true` or `1` fires the neutral reset burst after stopping.
    #[serde(default)]
    pub reset: Option<String>,
}

/// Response body for the stop endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct StopResponse {
    /// Number of sequences stopped.
    pub stopped: usize,
    /// Whether the reset burst was fired.
    pub reset: bool,
}

/// Response body for `GET /sequences`.
#[derive(Debug, Serialize, ToSchema)]
pub struct SequencesResponse {
    /// Names of running sequences, sorted.
    pub running: Vec<String>,
    /// Reactions `GET /react` accepts.
    pub reactions: Vec<String>,
}
