//! Timed command sequences.
//!
//! A sequence is an async routine that submits commands through a
//! [`Player`] and suspends between them. The player is the only suspension
//! primitive: every [`Player::pause`] checks the cancellation token before
//! and after the delay, so a cancelled sequence stops at its next pause
//! boundary. Ordering is guaranteed only within one sequence.
//!
//! Sequences run on the tokio clock, so tests drive them deterministically
//! with `#[tokio::test(start_paused = true)]`.

pub mod gestures;
pub mod idle;
pub mod lipsync;
pub mod reactions;
pub mod roast;

#[cfg(test)]
pub(crate) mod test_support;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio_util::sync::CancellationToken;

use crate::domain::Command;

/// Destination for commands emitted by sequences.
pub trait CommandSink: Send + Sync + fmt::Debug {
    /// Delivers one command. Returns whether the renderer received it.
    fn submit(&self, command: Command) -> bool;
}

/// Raised at a suspension point once the sequence has been cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("sequence cancelled")]
pub struct Cancelled;

/// One command followed by the delay before the next one.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    /// Command to send.
    pub command: Command,
    /// Pause after sending.
    pub delay: Duration,
}

impl Step {
    /// Step with a delay in milliseconds.
    #[must_use]
    pub const fn new(command: Command, delay_ms: u64) -> Self {
        Self {
            command,
            delay: Duration::from_millis(delay_ms),
        }
    }

    /// Step with no delay.
    #[must_use]
    pub const fn immediate(command: Command) -> Self {
        Self::new(command, 0)
    }
}

/// Execution context handed to a running sequence.
#[derive(Debug, Clone)]
pub struct Player {
    sink: Arc<dyn CommandSink>,
    cancel: CancellationToken,
    seed: Option<u64>,
}

impl Player {
    /// Creates a player that submits to `sink` until `cancel` fires.
    #[must_use]
    pub fn new(sink: Arc<dyn CommandSink>, cancel: CancellationToken) -> Self {
        Self {
            sink,
            cancel,
            seed: None,
        }
    }

    /// Makes every random stream of this player deterministic.
    #[must_use]
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Submits a command immediately.
    pub fn send(&self, command: Command) -> bool {
        self.sink.submit(command)
    }

    /// Returns `Err(Cancelled)` if the sequence has been cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] once the token has fired.
    pub fn check(&self) -> Result<(), Cancelled> {
        if self.cancel.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }

    /// Suspends for `delay`, ending early if the sequence is cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] if the token fired before or during the delay.
    pub async fn pause(&self, delay: Duration) -> Result<(), Cancelled> {
        self.check()?;
        if delay.is_zero() {
            tokio::task::yield_now().await;
            return self.check();
        }
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(Cancelled),
            () = tokio::time::sleep(delay) => self.check(),
        }
    }

    /// Suspends for `ms` milliseconds.
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] if the token fired before or during the delay.
    pub async fn pause_ms(&self, ms: u64) -> Result<(), Cancelled> {
        self.pause(Duration::from_millis(ms)).await
    }

    /// Plays a list of steps in order. Returns the number of steps sent.
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] if the sequence was cancelled between steps.
    pub async fn play<I>(&self, steps: I) -> Result<usize, Cancelled>
    where
        I: IntoIterator<Item = Step>,
    {
        let mut sent = 0;
        for step in steps {
            self.check()?;
            let _ = self.send(step.command);
            sent += 1;
            self.pause(step.delay).await?;
        }
        Ok(sent)
    }

    /// Returns a random generator for the given stream index.
    #[must_use]
    pub fn rng(&self, stream: u64) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(stream)),
            None => StdRng::from_rng(&mut rand::rng()),
        }
    }

    /// Returns `true` once the sequence has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
