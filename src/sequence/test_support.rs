use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

use super::CommandSink;
use crate::domain::Command;

/// Sink that records each command with its offset on the tokio clock.
#[derive(Debug)]
pub(crate) struct RecordingSink {
    start: Instant,
    log: Mutex<Vec<(Duration, Command)>>,
}

impl RecordingSink {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            start: Instant::now(),
            log: Mutex::new(Vec::new()),
        })
    }

    /// Shares this sink as the trait object a [`super::Player`] expects.
    pub(crate) fn as_sink(self: &Arc<Self>) -> Arc<dyn CommandSink> {
        let sink: Arc<Self> = Arc::clone(self);
        sink
    }

    pub(crate) fn entries(&self) -> Vec<(Duration, Command)> {
        self.log.lock().clone()
    }

    pub(crate) fn commands(&self) -> Vec<Command> {
        self.log.lock().iter().map(|(_, c)| c.clone()).collect()
    }

    /// Offset in milliseconds of the first command matching `pred`.
    pub(crate) fn first_at(&self, pred: impl Fn(&Command) -> bool) -> Option<u128> {
        self.log
            .lock()
            .iter()
            .find(|(_, c)| pred(c))
            .map(|(at, _)| at.as_millis())
    }
}

impl CommandSink for RecordingSink {
    fn submit(&self, command: Command) -> bool {
        self.log.lock().push((self.start.elapsed(), command));
        true
    }
}
