//! Named reaction choreographies.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::Serialize;

use super::{Cancelled, Player};
use crate::domain::{Character, Command, EyeState};

/// Lookup of a reaction name that does not exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown reaction: {name}")]
pub struct UnknownReaction {
    /// Name that was requested.
    pub name: String,
}

impl UnknownReaction {
    /// Every valid reaction name.
    #[must_use]
    pub fn available() -> Vec<&'static str> {
        Reaction::ALL.iter().map(|r| r.name()).collect()
    }
}

/// A short scripted reaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reaction {
    /// Terry recoils with an open mouth.
    TerryShocked,
    /// Terry laughs with a bobbing head.
    TerryLaugh,
    /// Terry turns away in disgust.
    TerryDisgust,
    /// Terry nods with his eyes.
    TerryNod,
    /// Nigel squints sideways.
    NigelSkeptical,
    /// Nigel widens his eyes.
    NigelImpressed,
    /// Nigel blinks once.
    NigelBlink,
    /// Nigel rolls his eyes.
    NigelEyeroll,
    /// Both face the camera.
    BothLookCamera,
    /// Both turn toward each other.
    BothLookEachOther,
    /// Everything back to neutral.
    Reset,
}

impl Reaction {
    /// Every reaction, in catalogue order.
    pub const ALL: [Self; 11] = [
        Self::TerryShocked,
        Self::TerryLaugh,
        Self::TerryDisgust,
        Self::TerryNod,
        Self::NigelSkeptical,
        Self::NigelImpressed,
        Self::NigelBlink,
        Self::NigelEyeroll,
        Self::BothLookCamera,
        Self::BothLookEachOther,
        Self::Reset,
    ];

    /// Catalogue name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::TerryShocked => "terry_shocked",
            Self::TerryLaugh => "terry_laugh",
            Self::TerryDisgust => "terry_disgust",
            Self::TerryNod => "terry_nod",
            Self::NigelSkeptical => "nigel_skeptical",
            Self::NigelImpressed => "nigel_impressed",
            Self::NigelBlink => "nigel_blink",
            Self::NigelEyeroll => "nigel_eyeroll",
            Self::BothLookCamera => "both_look_camera",
            Self::BothLookEachOther => "both_look_each_other",
            Self::Reset => "reset",
        }
    }

    /// Plays the reaction.
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] if the reaction was interrupted.
    pub async fn play(self, player: Player) -> Result<(), Cancelled> {
        use Character::{Nigel, Terry};

        match self {
            Self::TerryShocked => {
                player.send(Command::head(Terry, -5.0));
                player.send(Command::mouth(Terry, 4));
                player.send(Command::pupil(0.0, -8.0));
                player.pause_ms(800).await?;
                player.send(Command::mouth(Terry, 0));
            }
            Self::TerryLaugh => {
                let mut rng = player.rng(10);
                player.send(Command::talking(Terry, true));
                for _ in 0..8 {
                    player.send(Command::mouth(Terry, 1));
                    player.send(Command::head(Terry, rng.random_range(-5.0..5.0)));
                    player.pause_ms(100).await?;
                    player.send(Command::mouth(Terry, 7));
                    player.pause_ms(100).await?;
                }
                player.send(Command::mouth(Terry, 0));
                player.send(Command::head(Terry, 0.0));
                player.send(Command::talking(Terry, false));
            }
            Self::TerryDisgust => {
                player.send(Command::head(Terry, -25.0));
                player.send(Command::mouth(Terry, 5));
                player.send(Command::pupil(-15.0, 0.0));
                player.pause_ms(500).await?;
            }
            Self::TerryNod => {
                for _ in 0..3 {
                    player.send(Command::pupil(0.0, 5.0));
                    player.pause_ms(150).await?;
                    player.send(Command::pupil(0.0, -5.0));
                    player.pause_ms(150).await?;
                }
                player.send(Command::pupil(0.0, 0.0));
            }
            Self::NigelSkeptical => {
                player.send(Command::head(Nigel, 15.0));
                player.send(Command::eyes(Nigel, EyeState::Squint));
                player.send(Command::pupil(10.0, 0.0));
                player.pause_ms(600).await?;
            }
            Self::NigelImpressed => {
                player.send(Command::eyes(Nigel, EyeState::Wide));
                player.send(Command::head(Nigel, -10.0));
                player.send(Command::mouth(Nigel, 4));
                player.pause_ms(400).await?;
                player.send(Command::mouth(Nigel, 0));
            }
            Self::NigelBlink => {
                player.send(Command::eyes(Nigel, EyeState::Closed));
                player.pause_ms(150).await?;
                player.send(Command::eyes(Nigel, EyeState::Open));
            }
            Self::NigelEyeroll => {
                player.send(Command::pupil(0.0, -8.0));
                player.send(Command::eyes(Nigel, EyeState::Half));
                player.pause_ms(300).await?;
                for x in (-15..=15).step_by(5) {
                    player.send(Command::pupil(f64::from(x), -8.0));
                    player.pause_ms(50).await?;
                }
                player.send(Command::pupil(0.0, 0.0));
                player.send(Command::eyes(Nigel, EyeState::Open));
            }
            Self::BothLookCamera => {
                player.send(Command::head(Terry, 0.0));
                player.send(Command::head(Nigel, 0.0));
                player.send(Command::pupil(0.0, 0.0));
            }
            Self::BothLookEachOther => {
                player.send(Command::head(Terry, 30.0));
                player.send(Command::head(Nigel, -30.0));
                player.send(Command::pupil(0.0, 0.0));
            }
            Self::Reset => {
                for command in Command::neutral_reset() {
                    player.send(command);
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for Reaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Reaction {
    type Err = UnknownReaction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|r| r.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownReaction {
                name: wanted.to_string(),
            })
    }
}
