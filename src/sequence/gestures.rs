//! Short parameterized gestures: head shake, nod, and gaze directions.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Cancelled, Player};
use crate::domain::{Character, Command};

/// Default head-shake amplitude in degrees.
pub const DEFAULT_SHAKE_INTENSITY: f64 = 20.0;

/// Shakes a character's head left and right four times, then centers it.
///
/// # Errors
///
/// Returns [`Cancelled`] if the gesture was interrupted.
pub async fn shake(player: Player, character: Character, intensity: f64) -> Result<(), Cancelled> {
    for _ in 0..4 {
        player.send(Command::head(character, intensity));
        player.pause_ms(100).await?;
        player.send(Command::head(character, -intensity));
        player.pause_ms(100).await?;
    }
    player.send(Command::head(character, 0.0));
    Ok(())
}

/// Nods twice using the shared gaze, then recenters it.
///
/// # Errors
///
/// Returns [`Cancelled`] if the gesture was interrupted.
pub async fn nod(player: Player) -> Result<(), Cancelled> {
    for _ in 0..2 {
        player.send(Command::pupil(0.0, -5.0));
        player.pause_ms(150).await?;
        player.send(Command::pupil(0.0, 5.0));
        player.pause_ms(150).await?;
    }
    player.send(Command::pupil(0.0, 0.0));
    Ok(())
}

/// Named gaze direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LookDirection {
    /// Straight ahead.
    #[default]
    Center,
    /// Left.
    Left,
    /// Right.
    Right,
    /// Up.
    Up,
    /// Down.
    Down,
    /// Up and to the left.
    UpLeft,
    /// Up and to the right.
    UpRight,
    /// Down and to the left.
    DownLeft,
    /// Down and to the right.
    DownRight,
}

impl LookDirection {
    /// Pupil offset for this direction.
    #[must_use]
    pub const fn offset(self) -> (f64, f64) {
        match self {
            Self::Center => (0.0, 0.0),
            Self::Left => (-15.0, 0.0),
            Self::Right => (15.0, 0.0),
            Self::Up => (0.0, -8.0),
            Self::Down => (0.0, 8.0),
            Self::UpLeft => (-10.0, -5.0),
            Self::UpRight => (10.0, -5.0),
            Self::DownLeft => (-10.0, 5.0),
            Self::DownRight => (10.0, 5.0),
        }
    }

    /// Lower-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Center => "center",
            Self::Left => "left",
            Self::Right => "right",
            Self::Up => "up",
            Self::Down => "down",
            Self::UpLeft => "upleft",
            Self::UpRight => "upright",
            Self::DownLeft => "downleft",
            Self::DownRight => "downright",
        }
    }

    /// Pupil command for this direction.
    #[must_use]
    pub fn command(self) -> Command {
        let (x, y) = self.offset();
        Command::pupil(x, y)
    }
}

impl FromStr for LookDirection {
    type Err = String;

    /// Unrecognized names fall back to [`LookDirection::Center`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let direction = match s.trim().to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "left" => Self::Left,
            "right" => Self::Right,
            "up" => Self::Up,
            "down" => Self::Down,
            "upleft" => Self::UpLeft,
            "upright" => Self::UpRight,
            "downleft" => Self::DownLeft,
            "downright" => Self::DownRight,
            _ => Self::Center,
        };
        Ok(direction)
    }
}
