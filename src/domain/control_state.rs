//! In-memory mirror of the last value dispatched for every controllable
//! parameter.
//!
//! [`ControlState`] is a plain value type sent to newly classified
//! connections as a synchronization snapshot. [`StateMirror`] owns the
//! process-wide instance behind a lock and is the only place it is mutated.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::character::{
    Character, EyeState, MAX_MOUTH_SHAPE, clamp_head_angle, clamp_pupil_x, clamp_pupil_y,
};
use super::command::Command;

/// Last-known values for one character.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CharacterState {
    /// Mouth shape index, `0..=7`.
    pub mouth_shape: u8,
    /// Head angle in degrees, `[-40, 40]`.
    pub head_angle: f64,
    /// Whether the talking loop is active.
    pub talking: bool,
    /// Eye state, serialized as its numeric index.
    #[schema(value_type = u8)]
    pub eye_state: EyeState,
    /// Roast attitude level (0 = chill, 1 = smirk, 2 = roast).
    pub roast_level: u8,
}

/// Shared gaze position for both characters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, ToSchema)]
pub struct Pupil {
    /// Horizontal offset, `[-20, 20]`.
    pub x: f64,
    /// Vertical offset, `[-10, 10]`.
    pub y: f64,
}

/// Full snapshot of every controllable parameter.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
pub struct ControlState {
    /// Terry's parameters.
    pub terry: CharacterState,
    /// Nigel's parameters.
    pub nigel: CharacterState,
    /// Shared pupil position.
    pub pupil: Pupil,
}

impl ControlState {
    /// Returns the record for `character`.
    #[must_use]
    pub const fn character(&self, character: Character) -> &CharacterState {
        match character {
            Character::Terry => &self.terry,
            Character::Nigel => &self.nigel,
        }
    }

    fn character_mut(&mut self, character: Character) -> &mut CharacterState {
        match character {
            Character::Terry => &mut self.terry,
            Character::Nigel => &mut self.nigel,
        }
    }

    /// Applies a command to the snapshot. Commands that do not target a
    /// mirrored field leave it untouched.
    ///
    /// Returns `true` if a field was targeted.
    pub fn apply(&mut self, command: &Command) -> bool {
        match command {
            Command::MouthShape { character, shape } => {
                self.character_mut(*character).mouth_shape = (*shape).min(MAX_MOUTH_SHAPE);
            }
            Command::HeadTurn { character, angle } => {
                self.character_mut(*character).head_angle = clamp_head_angle(*angle);
            }
            Command::Talking { character, talking } => {
                self.character_mut(*character).talking = *talking;
            }
            Command::Eyes { character, state } => {
                self.character_mut(*character).eye_state = *state;
            }
            Command::RoastLevel { character, level } => {
                self.character_mut(*character).roast_level = *level;
            }
            Command::Pupil { x, y } => {
                self.pupil = Pupil {
                    x: clamp_pupil_x(*x),
                    y: clamp_pupil_y(*y),
                };
            }
            Command::PlayAnimation { .. }
            | Command::StopAnimation { .. }
            | Command::ListAnimations
            | Command::Roast { .. }
            | Command::BoneEdit
            | Command::Bone { .. }
            | Command::SetRiveUrl { .. }
            | Command::ReloadRive { .. }
            | Command::Sync { .. } => return false,
        }
        true
    }
}

/// Process-scoped owner of the [`ControlState`].
///
/// All reads and writes go through this accessor; nothing holds the lock
/// across an await point.
#[derive(Debug, Default)]
pub struct StateMirror {
    state: RwLock<ControlState>,
}

impl StateMirror {
    /// Creates a mirror initialized to neutral defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a dispatched command.
    pub fn apply(&self, command: &Command) -> bool {
        self.state.write().apply(command)
    }

    /// Returns a copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> ControlState {
        self.state.read().clone()
    }

    /// Restores every field to its neutral default.
    pub fn reset(&self) {
        *self.state.write() = ControlState::default();
    }
}
