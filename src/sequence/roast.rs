//! The full roast choreography: intro, shock, Terry's roast lines, Nigel's
//! reaction, disgust, outro.

use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Cancelled, Player};
use crate::domain::{Character, Command, EyeState};

/// Lines Terry delivers when none are supplied.
pub const DEFAULT_LINES: [&str; 3] = [
    "Yo what is this",
    "This dude really thought he did something",
    "Nah this is crazy",
];

/// Interlude reaction between roast phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Beat {
    /// Terry turns away, Nigel squints.
    Disgust,
    /// Both gape, Nigel's eyes go wide.
    Shock,
    /// Heads tilt apart, Nigel half-closes his eyes.
    Confused,
}

/// Script for one roast run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoastScript {
    /// Lines Terry speaks, in order.
    pub lines: Vec<String>,
    /// Beat played after Nigel's reaction.
    pub closing: Beat,
}

impl Default for RoastScript {
    fn default() -> Self {
        Self {
            lines: DEFAULT_LINES.iter().map(ToString::to_string).collect(),
            closing: Beat::Disgust,
        }
    }
}

impl RoastScript {
    /// Script with custom lines. Blank lines are dropped; an empty result
    /// falls back to the default lines.
    #[must_use]
    pub fn with_lines(lines: Vec<String>) -> Self {
        let lines: Vec<String> = lines
            .into_iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
        if lines.is_empty() {
            Self::default()
        } else {
            Self {
                lines,
                ..Self::default()
            }
        }
    }

    /// Replaces the closing beat.
    #[must_use]
    pub fn closing(mut self, beat: Beat) -> Self {
        self.closing = beat;
        self
    }

    /// Plays the whole roast.
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] if the roast was interrupted.
    pub async fn play(self, player: Player) -> Result<(), Cancelled> {
        let mut rng = player.rng(20);

        tracing::debug!(phase = "intro", "roast");
        intro(&player).await?;
        player.pause_ms(500).await?;

        tracing::debug!(phase = "shock", "roast");
        beat(&player, Beat::Shock).await?;
        player.pause_ms(300).await?;

        tracing::debug!(phase = "terry_roast", lines = self.lines.len(), "roast");
        terry_roast(&player, &self.lines, &mut rng).await?;
        player.pause_ms(200).await?;

        tracing::debug!(phase = "nigel_react", "roast");
        nigel_react(&player, &mut rng).await?;
        player.pause_ms(300).await?;

        tracing::debug!(phase = "closing", beat = ?self.closing, "roast");
        beat(&player, self.closing).await?;
        player.pause_ms(500).await?;

        tracing::debug!(phase = "outro", "roast");
        outro(&player).await
    }
}

async fn intro(player: &Player) -> Result<(), Cancelled> {
    player.send(Command::head(Character::Terry, 0.0));
    player.send(Command::head(Character::Nigel, 0.0));
    player.send(Command::pupil(0.0, 0.0));
    player.pause_ms(500).await?;

    player.send(Command::head(Character::Terry, -35.0));
    player.send(Command::pupil(-15.0, 0.0));
    player.pause_ms(300).await?;

    player.send(Command::head(Character::Nigel, -25.0));
    player.pause_ms(1000).await
}

/// Plays one interlude reaction.
///
/// # Errors
///
/// Returns [`Cancelled`] if the beat was interrupted.
pub async fn beat(player: &Player, kind: Beat) -> Result<(), Cancelled> {
    match kind {
        Beat::Disgust => {
            player.send(Command::head(Character::Terry, -20.0));
            player.send(Command::mouth(Character::Terry, 5));
            player.send(Command::eyes(Character::Nigel, EyeState::Squint));
            player.pause_ms(800).await
        }
        Beat::Shock => {
            player.send(Command::mouth(Character::Terry, 4));
            player.send(Command::mouth(Character::Nigel, 4));
            player.send(Command::eyes(Character::Nigel, EyeState::Wide));
            // Gaze keeps the intro's sideways glance
            player.send(Command::pupil(-15.0, -5.0));
            player.pause_ms(600).await
        }
        Beat::Confused => {
            player.send(Command::head(Character::Terry, 15.0));
            player.send(Command::head(Character::Nigel, -15.0));
            player.send(Command::eyes(Character::Nigel, EyeState::Half));
            player.pause_ms(700).await
        }
    }
}

/// Mouth shape for one letter of a roast line: vowels map to their own
/// shape, everything else flips between the two consonant shapes.
fn roast_shape(c: char, rng: &mut StdRng) -> u8 {
    match "aeiou".find(c.to_ascii_lowercase()) {
        #[allow(clippy::cast_possible_truncation)]
        Some(index) => index as u8 + 1,
        None if rng.random_bool(0.5) => 6,
        None => 7,
    }
}

async fn terry_roast(player: &Player, lines: &[String], rng: &mut StdRng) -> Result<(), Cancelled> {
    player.send(Command::head(Character::Terry, 5.0));
    player.send(Command::talking(Character::Terry, true));

    for line in lines {
        for c in line.chars() {
            player.send(Command::mouth(Character::Terry, roast_shape(c, rng)));
            player.pause_ms(50).await?;
        }
        player.send(Command::mouth(Character::Terry, 0));
        player.pause_ms(200).await?;
    }

    player.send(Command::talking(Character::Terry, false));
    Ok(())
}

async fn nigel_react(player: &Player, rng: &mut StdRng) -> Result<(), Cancelled> {
    for _ in 0..3 {
        player.send(Command::head(Character::Nigel, 15.0));
        player.pause_ms(100).await?;
        player.send(Command::head(Character::Nigel, -15.0));
        player.pause_ms(100).await?;
    }
    player.send(Command::head(Character::Nigel, 0.0));

    player.send(Command::talking(Character::Nigel, true));
    for _ in 0..10 {
        player.send(Command::mouth(Character::Nigel, rng.random_range(1..=7)));
        player.pause_ms(60).await?;
    }
    player.send(Command::mouth(Character::Nigel, 0));
    player.send(Command::talking(Character::Nigel, false));
    Ok(())
}

async fn outro(player: &Player) -> Result<(), Cancelled> {
    player.send(Command::head(Character::Terry, 0.0));
    player.send(Command::head(Character::Nigel, 0.0));
    player.send(Command::pupil(0.0, 0.0));
    player.send(Command::mouth(Character::Terry, 2));
    player.send(Command::eyes(Character::Nigel, EyeState::Squint));
    player.pause_ms(1500).await?;

    player.send(Command::mouth(Character::Terry, 0));
    player.send(Command::eyes(Character::Nigel, EyeState::Open));
    Ok(())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::time::Duration;

    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::sequence::test_support::RecordingSink;

    fn expected_duration_ms(lines: &[&str]) -> u128 {
        let intro = 500 + 300 + 1000;
        let speech: usize = lines.iter().map(|l| l.chars().count() * 50 + 200).sum();
        let nigel = 6 * 100 + 10 * 60;
        // intro, gap, shock, gap, speech, gap, nigel, gap, disgust, gap, outro
        (intro + 500 + 600 + 300 + speech + 200 + nigel + 300 + 800 + 500 + 1500) as u128
    }

    #[tokio::test(start_paused = true)]
    async fn default_roast_runs_every_phase_in_order() {
        let sink = RecordingSink::new();
        let player = Player::new(sink.as_sink(), CancellationToken::new()).with_seed(Some(5));
        let Ok(()) = RoastScript::default().play(player).await else {
            panic!("roast cancelled");
        };

        let entries = sink.entries();
        let Some((end, last)) = entries.last() else {
            panic!("nothing recorded");
        };
        assert_eq!(*last, Command::eyes(Character::Nigel, EyeState::Open));
        assert_eq!(end.as_millis(), expected_duration_ms(&DEFAULT_LINES));

        let shock = sink.first_at(|c| *c == Command::mouth(Character::Nigel, 4));
        let terry_talks = sink.first_at(|c| *c == Command::talking(Character::Terry, true));
        let nigel_talks = sink.first_at(|c| *c == Command::talking(Character::Nigel, true));
        assert_eq!(shock, Some(2300));
        assert_eq!(terry_talks, Some(3200));
        assert!(nigel_talks > terry_talks);
    }

    #[tokio::test(start_paused = true)]
    async fn custom_lines_change_speech_length() {
        let sink = RecordingSink::new();
        let player = Player::new(sink.as_sink(), CancellationToken::new()).with_seed(Some(5));
        let script = RoastScript::with_lines(vec!["aeiou".to_string(), "  ".to_string()]);
        assert_eq!(script.lines, vec!["aeiou".to_string()]);
        let Ok(()) = script.play(player).await else {
            panic!("roast cancelled");
        };

        let vowels: Vec<u8> = sink
            .commands()
            .iter()
            .skip_while(|c| **c != Command::talking(Character::Terry, true))
            .filter_map(|c| match c {
                Command::MouthShape {
                    character: Character::Terry,
                    shape,
                } => Some(*shape),
                _ => None,
            })
            .take(5)
            .collect();
        assert_eq!(vowels, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test(start_paused = true)]
    async fn confused_closing_replaces_disgust() {
        let sink = RecordingSink::new();
        let player = Player::new(sink.as_sink(), CancellationToken::new()).with_seed(Some(9));
        let script = RoastScript::default().closing(Beat::Confused);
        let Ok(()) = script.play(player).await else {
            panic!("roast cancelled");
        };
        let commands = sink.commands();
        assert!(commands.contains(&Command::eyes(Character::Nigel, EyeState::Half)));
        assert!(!commands.contains(&Command::head(Character::Terry, -20.0)));
    }

    #[test]
    fn empty_custom_lines_fall_back_to_defaults() {
        assert_eq!(RoastScript::with_lines(Vec::new()), RoastScript::default());
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_roast_stops_sending() {
        let sink = RecordingSink::new();
        let cancel = CancellationToken::new();
        let player = Player::new(sink.as_sink(), cancel.clone());
        let task = tokio::spawn(RoastScript::default().play(player));

        tokio::time::sleep(Duration::from_millis(1000)).await;
        cancel.cancel();
        let Ok(result) = task.await else {
            panic!("roast task panicked");
        };
        assert_eq!(result, Err(Cancelled));

        let count = sink.entries().len();
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(sink.entries().len(), count);
        assert!(sink.first_at(|c| *c == Command::talking(Character::Terry, true)).is_none());
    }
}
