//! Characters, eye states and the numeric ranges of every controllable
//! parameter.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use utoipa::ToSchema;

/// Highest mouth-shape index understood by the renderer.
pub const MAX_MOUTH_SHAPE: u8 = 7;

/// Highest roast attitude level (0 = chill, 1 = smirk, 2 = roast).
pub const MAX_ROAST_LEVEL: u8 = 2;

/// Absolute head-turn limit in degrees.
pub const HEAD_ANGLE_LIMIT: f64 = 40.0;

/// Absolute horizontal pupil limit.
pub const PUPIL_X_LIMIT: f64 = 20.0;

/// Absolute vertical pupil limit.
pub const PUPIL_Y_LIMIT: f64 = 10.0;

/// Animated character on the renderer's stage.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Character {
    /// Terry, the roaster.
    #[default]
    Terry,
    /// Nigel, the sidekick.
    Nigel,
}

impl Character {
    /// Both characters, in stage order.
    pub const ALL: [Self; 2] = [Self::Terry, Self::Nigel];

    /// Lower-case tag used on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Terry => "terry",
            Self::Nigel => "nigel",
        }
    }

    /// Rive input name for this character's head turn.
    #[must_use]
    pub const fn head_input(self) -> &'static str {
        match self {
            Self::Terry => "terry_headTurn",
            Self::Nigel => "nigel_headTurn",
        }
    }

    /// Rive input name for this character's eyes.
    #[must_use]
    pub const fn eyes_input(self) -> &'static str {
        match self {
            Self::Terry => "terryEyes",
            Self::Nigel => "nigelEyes",
        }
    }

    /// Rive input name for this character's roast attitude.
    #[must_use]
    pub const fn roast_input(self) -> &'static str {
        match self {
            Self::Terry => "terryRoast",
            Self::Nigel => "nigelRoast",
        }
    }
}

impl fmt::Display for Character {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Character {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "terry" => Ok(Self::Terry),
            "nigel" => Ok(Self::Nigel),
            other => Err(format!("unknown character: {other}")),
        }
    }
}

/// Eye state of a character. Sent to the renderer as its numeric index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EyeState {
    /// Fully open (0).
    #[default]
    Open,
    /// Closed (1).
    Closed,
    /// Half closed (2).
    Half,
    /// Squinting (3).
    Squint,
    /// Wide open (4).
    Wide,
}

impl EyeState {
    /// Numeric index understood by the renderer.
    #[must_use]
    pub const fn index(self) -> u8 {
        match self {
            Self::Open => 0,
            Self::Closed => 1,
            Self::Half => 2,
            Self::Squint => 3,
            Self::Wide => 4,
        }
    }

    /// Maps a numeric index back to an eye state.
    #[must_use]
    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::Open),
            1 => Some(Self::Closed),
            2 => Some(Self::Half),
            3 => Some(Self::Squint),
            4 => Some(Self::Wide),
            _ => None,
        }
    }

    /// Lower-case name of the state.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Half => "half",
            Self::Squint => "squint",
            Self::Wide => "wide",
        }
    }
}

impl FromStr for EyeState {
    type Err = String;

    /// Accepts either a state name (`"squint"`) or its index (`"3"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        if let Ok(index) = s.parse::<u8>() {
            return Self::from_index(index).ok_or_else(|| format!("eye state out of range: {s}"));
        }
        match s.as_str() {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            "half" => Ok(Self::Half),
            "squint" => Ok(Self::Squint),
            "wide" => Ok(Self::Wide),
            other => Err(format!("unknown eye state: {other}")),
        }
    }
}

impl Serialize for EyeState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.index())
    }
}

impl<'de> Deserialize<'de> for EyeState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let index = u8::deserialize(deserializer)?;
        Self::from_index(index)
            .ok_or_else(|| serde::de::Error::custom(format!("eye state out of range: {index}")))
    }
}

/// Clamps a requested mouth shape into `0..=7`, rounding fractional input.
#[must_use]
pub fn clamp_mouth_shape(shape: f64) -> u8 {
    clamp_index(shape, MAX_MOUTH_SHAPE)
}

/// Clamps a requested roast level into `0..=2`, rounding fractional input.
#[must_use]
pub fn clamp_roast_level(level: f64) -> u8 {
    clamp_index(level, MAX_ROAST_LEVEL)
}

fn clamp_index(value: f64, max: u8) -> u8 {
    if !value.is_finite() {
        return 0;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let rounded = value.round().clamp(0.0, f64::from(max)) as u8;
    rounded
}

/// Clamps a head angle into `[-40, 40]`. NaN becomes 0.
#[must_use]
pub fn clamp_head_angle(angle: f64) -> f64 {
    clamp_symmetric(angle, HEAD_ANGLE_LIMIT)
}

/// Clamps a pupil x coordinate into `[-20, 20]`.
#[must_use]
pub fn clamp_pupil_x(x: f64) -> f64 {
    clamp_symmetric(x, PUPIL_X_LIMIT)
}

/// Clamps a pupil y coordinate into `[-10, 10]`.
#[must_use]
pub fn clamp_pupil_y(y: f64) -> f64 {
    clamp_symmetric(y, PUPIL_Y_LIMIT)
}

fn clamp_symmetric(value: f64, limit: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(-limit, limit)
    }
}
