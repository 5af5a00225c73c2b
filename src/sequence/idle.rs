//! Ambient idle behavior.
//!
//! Four independent loops run concurrently until cancelled: a wandering
//! gaze, Nigel's blinking, a slow sinusoidal head sway, and occasional
//! micro-expressions. Each loop owns its own random stream.

use std::time::Duration;

use parking_lot::Mutex;
use rand::Rng;

use super::{Cancelled, Player};
use crate::domain::{Character, Command, EyeState};

/// Frame period of the gaze and sway loops.
pub const FRAME: Duration = Duration::from_millis(50);

/// Horizontal range of idle gaze targets.
pub const GAZE_X_RANGE: f64 = 12.0;

/// Vertical range of idle gaze targets.
pub const GAZE_Y_RANGE: f64 = 6.0;

const GAZE_BLEND: f64 = 0.1;
const GAZE_STEPS: usize = 20;
const SWAY_STEP: f64 = 0.02;

/// Runs every idle loop until the player is cancelled.
///
/// # Errors
///
/// Always ends with [`Cancelled`]; idle never finishes on its own.
pub async fn run(player: Player) -> Result<(), Cancelled> {
    let position = Mutex::new((0.0, 0.0));
    let (gaze, blink, sway, micro) = tokio::join!(
        wander_gaze(&player, &position),
        blink(&player),
        sway(&player),
        micro_expressions(&player, &position),
    );
    gaze.and(blink).and(sway).and(micro)
}

fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

/// Last pupil position sent by the gaze loop.
type GazePosition = Mutex<(f64, f64)>;

async fn wander_gaze(player: &Player, position: &GazePosition) -> Result<(), Cancelled> {
    let mut rng = player.rng(0);
    let (mut x, mut y) = (0.0, 0.0);
    loop {
        let target_x = rng.random_range(-GAZE_X_RANGE..GAZE_X_RANGE);
        let target_y = rng.random_range(-GAZE_Y_RANGE..GAZE_Y_RANGE);
        for _ in 0..GAZE_STEPS {
            x = lerp(x, target_x, GAZE_BLEND);
            y = lerp(y, target_y, GAZE_BLEND);
            *position.lock() = (x, y);
            player.send(Command::pupil(x, y));
            player.pause(FRAME).await?;
        }
        player.pause_ms(rng.random_range(2000..4000)).await?;
    }
}

async fn blink(player: &Player) -> Result<(), Cancelled> {
    let mut rng = player.rng(1);
    loop {
        player.pause_ms(rng.random_range(3000..7000)).await?;
        player.send(Command::eyes(Character::Nigel, EyeState::Closed));
        player.pause_ms(100).await?;
        player.send(Command::eyes(Character::Nigel, EyeState::Open));

        if rng.random_bool(0.3) {
            player.pause_ms(150).await?;
            player.send(Command::eyes(Character::Nigel, EyeState::Closed));
            player.pause_ms(80).await?;
            player.send(Command::eyes(Character::Nigel, EyeState::Open));
        }
    }
}

async fn sway(player: &Player) -> Result<(), Cancelled> {
    let mut t: f64 = 0.0;
    loop {
        t += SWAY_STEP;
        player.send(Command::head(Character::Terry, (t * 0.5).sin() * 8.0));
        player.send(Command::head(Character::Nigel, (t * 0.3 + 1.0).sin() * 6.0));
        player.pause(FRAME).await?;
    }
}

async fn micro_expressions(player: &Player, position: &GazePosition) -> Result<(), Cancelled> {
    let mut rng = player.rng(2);
    loop {
        player.pause_ms(rng.random_range(8000..15000)).await?;
        match rng.random_range(0..3) {
            0 => {
                player.send(Command::eyes(Character::Nigel, EyeState::Squint));
                player.pause_ms(800).await?;
                player.send(Command::eyes(Character::Nigel, EyeState::Open));
            }
            1 => {
                player.send(Command::mouth(Character::Terry, 2));
                player.pause_ms(600).await?;
                player.send(Command::mouth(Character::Terry, 0));
            }
            _ => glance(player, position, rng.random_range(-15.0..15.0)).await?,
        }
    }
}

/// Quick sideways glance at the current height; the gaze loop takes over
/// again on its next frame.
async fn glance(player: &Player, position: &GazePosition, x: f64) -> Result<(), Cancelled> {
    let (_, y) = *position.lock();
    player.send(Command::pupil(x, y));
    player.pause_ms(1000).await
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Arc;

    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::sequence::test_support::RecordingSink;

    async fn run_for(seconds: u64) -> Arc<RecordingSink> {
        let sink = RecordingSink::new();
        let cancel = CancellationToken::new();
        let player = Player::new(sink.as_sink(), cancel.clone()).with_seed(Some(11));
        let task = tokio::spawn(run(player));
        tokio::time::sleep(Duration::from_secs(seconds)).await;
        cancel.cancel();
        let Ok(result) = task.await else {
            panic!("idle task panicked");
        };
        assert_eq!(result, Err(Cancelled));
        sink
    }

    #[tokio::test(start_paused = true)]
    async fn gaze_and_sway_stay_in_range() {
        let sink = run_for(20).await;
        let commands = sink.commands();
        assert!(!commands.is_empty());
        for command in &commands {
            match command {
                Command::Pupil { x, y } => {
                    assert!(x.abs() <= 15.0, "x out of range: {x}");
                    assert!(y.abs() <= GAZE_Y_RANGE, "y out of range: {y}");
                }
                Command::HeadTurn { character, angle } => {
                    let limit = match character {
                        Character::Terry => 8.0,
                        Character::Nigel => 6.0,
                    };
                    assert!(angle.abs() <= limit);
                }
                _ => {}
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn blink_loop_fires_within_window() {
        let sink = run_for(20).await;
        let Some(first) =
            sink.first_at(|c| *c == Command::eyes(Character::Nigel, EyeState::Closed))
        else {
            panic!("no blink in 20 seconds");
        };
        assert!((3000..7000).contains(&first), "first blink at {first} ms");
    }

    #[tokio::test(start_paused = true)]
    async fn sway_emits_both_heads_every_frame() {
        let sink = run_for(1).await;
        let terry = sink
            .commands()
            .iter()
            .filter(|c| matches!(c, Command::HeadTurn { character: Character::Terry, .. }))
            .count();
        assert!((19..=21).contains(&terry), "terry frames: {terry}");
    }

    #[tokio::test(start_paused = true)]
    async fn glance_keeps_current_height() {
        let sink = RecordingSink::new();
        let player = Player::new(sink.as_sink(), CancellationToken::new());
        let position = Mutex::new((3.0, -4.5));
        assert_eq!(glance(&player, &position, 10.0).await, Ok(()));
        assert_eq!(sink.commands(), vec![Command::pupil(10.0, -4.5)]);
    }

    #[tokio::test(start_paused = true)]
    async fn stops_promptly_when_cancelled() {
        let sink = run_for(5).await;
        let before = sink.entries().len();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(sink.entries().len(), before);
    }
}
