//! Heartbeat ping/pong liveness monitoring.
//!
//! One monitor sweeps every registered connection on a fixed period. A
//! connection that has not acknowledged since the previous sweep is closed
//! and removed; every other connection gets its flag cleared and a fresh
//! probe. A silent connection therefore survives at most two periods.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::domain::ConnectionRegistry;

/// Result of one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Connections that were probed.
    pub probed: usize,
    /// Connections closed for missing the previous probe.
    pub evicted: usize,
}

/// Periodic liveness detector over a [`ConnectionRegistry`].
#[derive(Debug, Clone)]
pub struct HeartbeatMonitor {
    registry: Arc<ConnectionRegistry>,
    interval: Duration,
}

impl HeartbeatMonitor {
    /// Creates a monitor that sweeps every `interval`.
    #[must_use]
    pub fn new(registry: Arc<ConnectionRegistry>, interval: Duration) -> Self {
        Self { registry, interval }
    }

    /// Runs one sweep over every registered connection.
    pub fn sweep(&self) -> SweepReport {
        let mut report = SweepReport::default();
        for connection in self.registry.connections() {
            if connection.check_alive() {
                let _ = connection.ping();
                report.probed += 1;
            } else {
                tracing::info!(conn_id = %connection.id(), "client timed out, terminating");
                connection.close();
                let _ = self.registry.remove(connection.id());
                report.evicted += 1;
            }
        }
        report
    }

    /// Sweeps on every tick until `cancel` fires.
    pub async fn run(self, cancel: CancellationToken) {
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // Skip the immediate first tick
        let _ = ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let report = self.sweep();
                    if report.evicted > 0 {
                        tracing::debug!(probed = report.probed, evicted = report.evicted, "heartbeat sweep");
                    }
                }
                () = cancel.cancelled() => break,
            }
        }
        tracing::debug!("heartbeat monitor stopped");
    }
}
