//! Lip-sync playback from phoneme timing data and from plain text.

use std::iter;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Cancelled, Player, Step};
use crate::domain::{Character, Command};

/// One timed phoneme, as produced by forced-alignment tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Cue {
    /// Offset from the start of playback, in seconds.
    pub time: f64,
    /// Phoneme label (ARPAbet, optionally with a stress digit).
    pub phoneme: String,
}

impl Cue {
    /// Creates a cue.
    #[must_use]
    pub fn new(time: f64, phoneme: impl Into<String>) -> Self {
        Self {
            time,
            phoneme: phoneme.into(),
        }
    }

    fn offset(&self) -> Duration {
        if self.time.is_finite() && self.time > 0.0 {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let ms = (self.time * 1000.0).round() as u64;
            Duration::from_millis(ms)
        } else {
            Duration::ZERO
        }
    }
}

/// Maps a phoneme label to a mouth shape. Unknown labels are silence.
#[must_use]
pub fn phoneme_shape(label: &str) -> u8 {
    let base = label.trim().trim_end_matches(|c: char| c.is_ascii_digit());
    match base.to_ascii_uppercase().as_str() {
        "AA" | "AE" | "AH" | "AO" | "AW" => 1,
        "EH" | "ER" | "EY" | "N" | "T" | "D" | "S" | "Z" => 2,
        "IH" | "IY" | "L" => 3,
        "OW" | "OY" => 4,
        "UH" | "UW" => 5,
        "F" | "V" => 6,
        "M" | "B" | "P" => 7,
        _ => 0,
    }
}

/// Lazily expands cues into steps: talking on, one shape per cue at its
/// offset, then shape 0 and talking off after the last cue.
pub fn cue_steps(character: Character, cues: &[Cue]) -> impl Iterator<Item = Step> + '_ {
    let lead_in = cues.first().map_or(Duration::ZERO, Cue::offset);
    let next_offsets = cues.iter().skip(1).map(|c| Some(c.offset())).chain(iter::once(None));

    iter::once(Step {
        command: Command::talking(character, true),
        delay: lead_in,
    })
    .chain(cues.iter().zip(next_offsets).map(move |(cue, next)| {
        // Out-of-order cues play back to back
        let delay = next.map_or(Duration::ZERO, |n| n.saturating_sub(cue.offset()));
        Step {
            command: Command::mouth(character, phoneme_shape(&cue.phoneme)),
            delay,
        }
    }))
    .chain([
        Step::immediate(Command::mouth(character, 0)),
        Step::immediate(Command::talking(character, false)),
    ])
}

/// Plays a cue list for one character.
///
/// # Errors
///
/// Returns [`Cancelled`] if playback was stopped early.
pub async fn play(player: Player, character: Character, cues: Vec<Cue>) -> Result<(), Cancelled> {
    let sent = player.play(cue_steps(character, &cues)).await?;
    tracing::debug!(%character, cues = cues.len(), sent, "lip sync finished");
    Ok(())
}

/// Mouth shape and hold time for one character of text.
#[must_use]
pub fn letter_viseme(c: char) -> (u8, u64) {
    let lower = c.to_ascii_lowercase();
    if let Some(index) = "aeiou".find(lower) {
        #[allow(clippy::cast_possible_truncation)]
        let shape = index as u8 + 1;
        return (shape, 80);
    }
    match lower {
        'l' | 'm' | 'n' | 'r' | 's' => (6, 50),
        'f' | 'v' | 'w' => (7, 60),
        _ => (0, 40),
    }
}

/// Steps that flap a character's mouth along the letters of `text`.
pub fn text_steps(character: Character, text: &str) -> impl Iterator<Item = Step> + '_ {
    iter::once(Step::immediate(Command::talking(character, true)))
        .chain(text.chars().map(move |c| {
            let (shape, hold) = letter_viseme(c);
            Step::new(Command::mouth(character, shape), hold)
        }))
        .chain([
            Step::immediate(Command::mouth(character, 0)),
            Step::immediate(Command::talking(character, false)),
        ])
}

/// Speaks `text` with letter-driven lip flaps. Returns the number of
/// mouth shapes played.
///
/// # Errors
///
/// Returns [`Cancelled`] if playback was stopped early.
pub async fn speak(player: Player, character: Character, text: String) -> Result<usize, Cancelled> {
    let sent = player.play(text_steps(character, &text)).await?;
    Ok(sent.saturating_sub(3))
}
