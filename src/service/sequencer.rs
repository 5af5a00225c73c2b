//! Named, cancellable sequence runner.
//!
//! Each running sequence lives in its own tokio task under a name. Starting
//! a name that is already running cancels the previous run first (without a
//! reset); different names run concurrently and may interleave on the wire.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::{Mutex, MutexGuard};
use serde::Serialize;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use utoipa::ToSchema;

use crate::domain::Command;
use crate::sequence::{Cancelled, CommandSink, Player};

/// Well-known sequence names.
pub mod names {
    /// Ambient idle loops.
    pub const IDLE: &str = "idle";
    /// Full roast choreography.
    pub const ROAST: &str = "roast";
    /// Cue-driven lip sync.
    pub const LIPSYNC: &str = "lipsync";
    /// Text-driven speech.
    pub const SPEAK: &str = "speak";
    /// Named reaction.
    pub const REACTION: &str = "reaction";
    /// Head shake or nod.
    pub const GESTURE: &str = "gesture";
}

/// How a sequence run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SequenceOutcome {
    /// Every step was played.
    Completed,
    /// The run was stopped or replaced.
    Cancelled,
}

/// Handle returned by [`Sequencer::start`].
#[derive(Debug)]
pub struct SequenceTicket {
    name: String,
    done: oneshot::Receiver<SequenceOutcome>,
}

impl SequenceTicket {
    /// Name the sequence was started under.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Waits for the run to end.
    pub async fn finished(self) -> SequenceOutcome {
        self.done.await.unwrap_or(SequenceOutcome::Cancelled)
    }
}

#[derive(Debug)]
struct Run {
    generation: u64,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Runs sequences by name and stops them on request.
#[derive(Debug)]
pub struct Sequencer {
    sink: Arc<dyn CommandSink>,
    runs: Arc<Mutex<HashMap<String, Run>>>,
    generation: AtomicU64,
    stop_timeout: Duration,
    seed: Option<u64>,
}

impl Sequencer {
    /// Creates a sequencer that plays into `sink`. Stopping waits at most
    /// `stop_timeout` for cancelled runs to wind down.
    #[must_use]
    pub fn new(sink: Arc<dyn CommandSink>, stop_timeout: Duration) -> Self {
        Self {
            sink,
            runs: Arc::new(Mutex::new(HashMap::new())),
            generation: AtomicU64::new(0),
            stop_timeout,
            seed: None,
        }
    }

    /// Seeds every player's random streams.
    #[must_use]
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Starts `body` under `name`, cancelling any run already using it.
    pub fn start<F, Fut>(&self, name: &str, body: F) -> SequenceTicket
    where
        F: FnOnce(Player) -> Fut,
        Fut: Future<Output = Result<(), Cancelled>> + Send + 'static,
    {
        let guard = self.runs.lock();
        self.launch(guard, name, body)
    }

    /// Starts `body` under `name` unless a run with that name is still in
    /// progress, in which case `None` is returned and nothing changes.
    pub fn start_unless_running<F, Fut>(&self, name: &str, body: F) -> Option<SequenceTicket>
    where
        F: FnOnce(Player) -> Fut,
        Fut: Future<Output = Result<(), Cancelled>> + Send + 'static,
    {
        let guard = self.runs.lock();
        if guard.get(name).is_some_and(|run| !run.handle.is_finished()) {
            return None;
        }
        Some(self.launch(guard, name, body))
    }

    fn launch<F, Fut>(
        &self,
        mut guard: MutexGuard<'_, HashMap<String, Run>>,
        name: &str,
        body: F,
    ) -> SequenceTicket
    where
        F: FnOnce(Player) -> Fut,
        Fut: Future<Output = Result<(), Cancelled>> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let player = Player::new(Arc::clone(&self.sink), cancel.clone()).with_seed(self.seed);
        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        let body = body(player);

        let runs = Arc::clone(&self.runs);
        let key = name.to_string();

        // Held across spawn so the task cannot deregister before insertion
        if let Some(previous) = guard.remove(name) {
            tracing::debug!(sequence = name, "restarting sequence");
            previous.cancel.cancel();
        }
        let handle = tokio::spawn(async move {
            let outcome = match body.await {
                Ok(()) => SequenceOutcome::Completed,
                Err(Cancelled) => SequenceOutcome::Cancelled,
            };
            {
                let mut runs = runs.lock();
                if runs.get(&key).is_some_and(|run| run.generation == generation) {
                    runs.remove(&key);
                }
            }
            tracing::debug!(sequence = %key, ?outcome, "sequence finished");
            let _ = tx.send(outcome);
        });
        guard.insert(
            name.to_string(),
            Run {
                generation,
                cancel,
                handle,
            },
        );
        drop(guard);

        tracing::info!(sequence = name, "sequence started");
        SequenceTicket {
            name: name.to_string(),
            done: rx,
        }
    }

    /// Stops the run named `name`, then optionally publishes the neutral
    /// reset burst. Returns whether a run was stopped.
    pub async fn stop(&self, name: &str, reset: bool) -> bool {
        let run = self.runs.lock().remove(name);
        let stopped = match run {
            Some(run) => {
                run.cancel.cancel();
                if tokio::time::timeout(self.stop_timeout, run.handle).await.is_err() {
                    tracing::warn!(sequence = name, "sequence did not stop in time");
                }
                tracing::info!(sequence = name, "sequence stopped");
                true
            }
            None => false,
        };
        if reset {
            self.reset();
        }
        stopped
    }

    /// Stops every run, then optionally publishes the reset burst.
    /// Returns the number of runs stopped.
    pub async fn stop_all(&self, reset: bool) -> usize {
        let runs: Vec<(String, Run)> = self.runs.lock().drain().collect();
        let count = runs.len();
        for (_, run) in &runs {
            run.cancel.cancel();
        }
        let handles = runs.into_iter().map(|(_, run)| run.handle);
        if tokio::time::timeout(self.stop_timeout, futures_util::future::join_all(handles))
            .await
            .is_err()
        {
            tracing::warn!(count, "sequences did not stop in time");
        }
        if count > 0 {
            tracing::info!(count, "all sequences stopped");
        }
        if reset {
            self.reset();
        }
        count
    }

    /// Names of the runs still in progress, sorted.
    #[must_use]
    pub fn running(&self) -> Vec<String> {
        let mut active: Vec<String> = self
            .runs
            .lock()
            .iter()
            .filter(|(_, run)| !run.handle.is_finished())
            .map(|(name, _)| name.clone())
            .collect();
        active.sort_unstable();
        active
    }

    /// Returns `true` if a run named `name` is in progress.
    #[must_use]
    pub fn is_running(&self, name: &str) -> bool {
        self.runs
            .lock()
            .get(name)
            .is_some_and(|run| !run.handle.is_finished())
    }

    /// Publishes the neutral reset burst.
    pub fn reset(&self) {
        for command in Command::neutral_reset() {
            let _ = self.sink.submit(command);
        }
    }
}
