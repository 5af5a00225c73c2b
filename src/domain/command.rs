//! Outbound command vocabulary.
//!
//! Every message the relay sends to a renderer or observer is a
//! [`Command`]. The wire form is a flat JSON envelope whose `command` field
//! names the kind; Rive input commands additionally carry `input`, `value`
//! and `character`:
//!
//! ```json
//! { "command": "rive", "input": "lipShape", "value": 3, "character": "terry" }
//! { "command": "rive", "input": "pupil", "x": 10.0, "y": -5.0 }
//! { "command": "playAnim", "name": "nigel_head_shake" }
//! { "command": "sync", "state": { "terry": { ... }, "nigel": { ... }, "pupil": { ... } } }
//! ```

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::character::{
    Character, EyeState, MAX_MOUTH_SHAPE, MAX_ROAST_LEVEL, clamp_head_angle, clamp_pupil_x,
    clamp_pupil_y,
};
use super::control_state::ControlState;

/// A single logical command. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Set a character's mouth shape (`lipShape`).
    MouthShape {
        /// Target character.
        character: Character,
        /// Shape index, `0..=7`.
        shape: u8,
    },
    /// Turn a character's head (`terry_headTurn` / `nigel_headTurn`).
    HeadTurn {
        /// Target character.
        character: Character,
        /// Angle in degrees, `[-40, 40]`.
        angle: f64,
    },
    /// Toggle a character's talking loop (`isTalking`).
    Talking {
        /// Target character.
        character: Character,
        /// New talking flag.
        talking: bool,
    },
    /// Set a character's eyes (`terryEyes` / `nigelEyes`).
    Eyes {
        /// Target character.
        character: Character,
        /// New eye state.
        state: EyeState,
    },
    /// Set a character's roast attitude (`terryRoast` / `nigelRoast`).
    RoastLevel {
        /// Target character.
        character: Character,
        /// Attitude level.
        level: u8,
    },
    /// Move the shared gaze (`pupil`).
    Pupil {
        /// Horizontal offset, `[-20, 20]`.
        x: f64,
        /// Vertical offset, `[-10, 10]`.
        y: f64,
    },
    /// Play a named timeline animation.
    PlayAnimation {
        /// Animation name.
        name: String,
    },
    /// Stop a named timeline animation.
    StopAnimation {
        /// Animation name.
        name: String,
    },
    /// Ask the renderer to log its animation list.
    ListAnimations,
    /// Start a roast of a submitted target.
    Roast {
        /// Name of the person being roasted.
        target: String,
        /// Footage URL, if any.
        footage: Option<String>,
        /// Character doing the roasting.
        character: Character,
    },
    /// Enter bone edit mode.
    BoneEdit,
    /// Rotate a named bone.
    Bone {
        /// Bone name.
        name: String,
        /// Rotation in degrees.
        angle: f64,
    },
    /// Point the renderer at a remote `.riv` file (`None` = bundled asset).
    SetRiveUrl {
        /// Remote URL.
        url: Option<String>,
    },
    /// Reload the current `.riv` file.
    ReloadRive {
        /// Remote URL, if configured.
        url: Option<String>,
    },
    /// Full state synchronization snapshot.
    Sync {
        /// Snapshot payload.
        state: Box<ControlState>,
    },
}

impl Command {
    /// Mouth shape command, clamped to `0..=7`.
    #[must_use]
    pub fn mouth(character: Character, shape: u8) -> Self {
        Self::MouthShape {
            character,
            shape: shape.min(MAX_MOUTH_SHAPE),
        }
    }

    /// Head turn command, clamped to `[-40, 40]`.
    #[must_use]
    pub fn head(character: Character, angle: f64) -> Self {
        Self::HeadTurn {
            character,
            angle: clamp_head_angle(angle),
        }
    }

    /// Talking flag command.
    #[must_use]
    pub const fn talking(character: Character, talking: bool) -> Self {
        Self::Talking { character, talking }
    }

    /// Eye state command.
    #[must_use]
    pub const fn eyes(character: Character, state: EyeState) -> Self {
        Self::Eyes { character, state }
    }

    /// Roast attitude command, clamped to `0..=2`.
    #[must_use]
    pub fn roast_level(character: Character, level: u8) -> Self {
        Self::RoastLevel {
            character,
            level: level.min(MAX_ROAST_LEVEL),
        }
    }

    /// Pupil command, clamped per axis.
    #[must_use]
    pub fn pupil(x: f64, y: f64) -> Self {
        Self::Pupil {
            x: clamp_pupil_x(x),
            y: clamp_pupil_y(y),
        }
    }

    /// Synchronization snapshot command.
    #[must_use]
    pub fn sync(state: ControlState) -> Self {
        Self::Sync {
            state: Box::new(state),
        }
    }

    /// Burst that returns every mirrored field to its neutral default.
    #[must_use]
    pub fn neutral_reset() -> Vec<Self> {
        let mut burst = Vec::with_capacity(11);
        for character in Character::ALL {
            burst.push(Self::mouth(character, 0));
            burst.push(Self::head(character, 0.0));
            burst.push(Self::eyes(character, EyeState::Open));
            burst.push(Self::roast_level(character, 0));
            burst.push(Self::talking(character, false));
        }
        burst.push(Self::pupil(0.0, 0.0));
        burst
    }

    /// Value of the `command` field on the wire.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MouthShape { .. }
            | Self::HeadTurn { .. }
            | Self::Talking { .. }
            | Self::Eyes { .. }
            | Self::RoastLevel { .. }
            | Self::Pupil { .. } => "rive",
            Self::PlayAnimation { .. } => "playAnim",
            Self::StopAnimation { .. } => "stopAnim",
            Self::ListAnimations => "listAnims",
            Self::Roast { .. } => "roast",
            Self::BoneEdit => "bones",
            Self::Bone { .. } => "bone",
            Self::SetRiveUrl { .. } => "setRiveUrl",
            Self::ReloadRive { .. } => "reloadRive",
            Self::Sync { .. } => "sync",
        }
    }

    /// Rive input name for `rive` commands.
    #[must_use]
    pub const fn input(&self) -> Option<&'static str> {
        match self {
            Self::MouthShape { .. } => Some("lipShape"),
            Self::HeadTurn { character, .. } => Some(character.head_input()),
            Self::Talking { .. } => Some("isTalking"),
            Self::Eyes { character, .. } => Some(character.eyes_input()),
            Self::RoastLevel { character, .. } => Some(character.roast_input()),
            Self::Pupil { .. } => Some("pupil"),
            _ => None,
        }
    }

    /// Serializes the command into its JSON envelope.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if the envelope cannot be written.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl Serialize for Command {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("command", self.kind())?;
        if let Some(input) = self.input() {
            map.serialize_entry("input", input)?;
        }
        match self {
            Self::MouthShape { character, shape } => {
                map.serialize_entry("value", shape)?;
                map.serialize_entry("character", character)?;
            }
            Self::HeadTurn { character, angle } => {
                map.serialize_entry("value", angle)?;
                map.serialize_entry("character", character)?;
            }
            Self::Talking { character, talking } => {
                map.serialize_entry("value", talking)?;
                map.serialize_entry("character", character)?;
            }
            Self::Eyes { character, state } => {
                map.serialize_entry("value", state)?;
                map.serialize_entry("character", character)?;
            }
            Self::RoastLevel { character, level } => {
                map.serialize_entry("value", level)?;
                map.serialize_entry("character", character)?;
            }
            Self::Pupil { x, y } => {
                map.serialize_entry("x", x)?;
                map.serialize_entry("y", y)?;
            }
            Self::PlayAnimation { name } | Self::StopAnimation { name } => {
                map.serialize_entry("name", name)?;
            }
            Self::ListAnimations | Self::BoneEdit => {}
            Self::Roast {
                target,
                footage,
                character,
            } => {
                map.serialize_entry("target", target)?;
                map.serialize_entry("footage", footage)?;
                map.serialize_entry("character", character)?;
            }
            Self::Bone { name, angle } => {
                map.serialize_entry("name", name)?;
                map.serialize_entry("angle", angle)?;
            }
            Self::SetRiveUrl { url } | Self::ReloadRive { url } => {
                map.serialize_entry("url", url)?;
            }
            Self::Sync { state } => {
                map.serialize_entry("state", state)?;
            }
        }
        map.end()
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn envelope(command: &Command) -> serde_json::Value {
        let Ok(value) = serde_json::to_value(command) else {
            panic!("serialization failed");
        };
        value
    }

    #[test]
    fn mouth_shape_envelope() {
        let json = envelope(&Command::mouth(Character::Terry, 3));
        assert_eq!(json["command"], "rive");
        assert_eq!(json["input"], "lipShape");
        assert_eq!(json["value"], 3);
        assert_eq!(json["character"], "terry");
    }

    #[test]
    fn head_turn_uses_character_specific_input() {
        let json = envelope(&Command::head(Character::Nigel, -55.0));
        assert_eq!(json["input"], "nigel_headTurn");
        assert_eq!(json["value"], -40.0);
    }

    #[test]
    fn pupil_envelope_has_xy_and_no_value() {
        let json = envelope(&Command::pupil(30.0, -3.0));
        assert_eq!(json["input"], "pupil");
        assert_eq!(json["x"], 20.0);
        assert_eq!(json["y"], -3.0);
        assert!(json.get("value").is_none());
        assert!(json.get("character").is_none());
    }

    #[test]
    fn eyes_value_is_numeric() {
        let json = envelope(&Command::eyes(Character::Nigel, EyeState::Squint));
        assert_eq!(json["input"], "nigelEyes");
        assert_eq!(json["value"], 3);
    }

    #[test]
    fn non_rive_commands_omit_input() {
        let json = envelope(&Command::PlayAnimation {
            name: "wave".to_string(),
        });
        assert_eq!(json["command"], "playAnim");
        assert_eq!(json["name"], "wave");
        assert!(json.get("input").is_none());
    }

    #[test]
    fn sync_envelope_embeds_state() {
        let json = envelope(&Command::sync(ControlState::default()));
        assert_eq!(json["command"], "sync");
        assert_eq!(json["state"]["pupil"]["x"], 0.0);
    }

    #[test]
    fn neutral_reset_restores_every_field() {
        let mut state = ControlState::default();
        state.apply(&Command::mouth(Character::Terry, 5));
        state.apply(&Command::head(Character::Nigel, 22.0));
        state.apply(&Command::talking(Character::Nigel, true));
        state.apply(&Command::eyes(Character::Terry, EyeState::Wide));
        state.apply(&Command::pupil(7.0, -4.0));
        for command in Command::neutral_reset() {
            state.apply(&command);
        }
        assert_eq!(state, ControlState::default());
    }

    #[test]
    fn mouth_constructor_clamps() {
        assert_eq!(
            Command::mouth(Character::Terry, 42),
            Command::MouthShape {
                character: Character::Terry,
                shape: 7
            }
        );
    }
}
