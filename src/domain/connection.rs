//! One live WebSocket connection as seen by the registry and dispatcher.
//!
//! The socket itself is owned by its session task; everything else talks to
//! it through a bounded outbound queue. Sends never wait: a full or closed
//! queue counts as "not sent".

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

use super::ConnectionId;
use super::command::Command;

/// Frame queued for the session's writer task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// Serialized JSON text frame.
    Text(Arc<str>),
    /// Protocol-level liveness probe.
    Ping,
}

/// Handle to a connected client.
#[derive(Debug)]
pub struct ClientConnection {
    id: ConnectionId,
    tx: mpsc::Sender<Outbound>,
    /// Set by every probe acknowledgment, cleared by every heartbeat tick.
    is_alive: AtomicBool,
    connected_at: DateTime<Utc>,
    closer: CancellationToken,
    dropped_messages: AtomicU64,
}

impl ClientConnection {
    /// Creates a connection handle that writes into `tx`.
    #[must_use]
    pub fn new(id: ConnectionId, tx: mpsc::Sender<Outbound>) -> Self {
        Self {
            id,
            tx,
            is_alive: AtomicBool::new(true),
            connected_at: Utc::now(),
            closer: CancellationToken::new(),
            dropped_messages: AtomicU64::new(0),
        }
    }

    /// Connection identity.
    #[must_use]
    pub const fn id(&self) -> ConnectionId {
        self.id
    }

    /// When the connection was accepted.
    #[must_use]
    pub const fn connected_at(&self) -> DateTime<Utc> {
        self.connected_at
    }

    /// Returns `true` until the connection is closed from either side.
    #[must_use]
    pub fn is_open(&self) -> bool {
        !self.closer.is_cancelled() && !self.tx.is_closed()
    }

    /// Queues a text frame. Returns `false` if the connection is closed or
    /// its queue is full.
    pub fn send_text(&self, text: Arc<str>) -> bool {
        self.enqueue(Outbound::Text(text))
    }

    /// Serializes and queues a command.
    pub fn send_command(&self, command: &Command) -> bool {
        match command.to_json() {
            Ok(json) => self.send_text(Arc::from(json)),
            Err(e) => {
                tracing::warn!(conn_id = %self.id, error = %e, "failed to serialize command");
                false
            }
        }
    }

    /// Queues a protocol ping.
    pub fn ping(&self) -> bool {
        self.enqueue(Outbound::Ping)
    }

    fn enqueue(&self, frame: Outbound) -> bool {
        if self.closer.is_cancelled() {
            return false;
        }
        if self.tx.try_send(frame).is_ok() {
            true
        } else {
            let _ = self.dropped_messages.fetch_add(1, Ordering::Relaxed);
            false
        }
    }

    /// Records a probe acknowledgment.
    pub fn mark_alive(&self) {
        self.is_alive.store(true, Ordering::Relaxed);
    }

    /// Returns whether the connection acknowledged since the last check and
    /// clears the flag.
    pub fn check_alive(&self) -> bool {
        self.is_alive.swap(false, Ordering::Relaxed)
    }

    /// Asks the session task to close the socket.
    pub fn close(&self) {
        self.closer.cancel();
    }

    /// Resolves once [`Self::close`] has been called.
    pub fn closed(&self) -> WaitForCancellationFuture<'_> {
        self.closer.cancelled()
    }

    /// Number of frames dropped because the queue was full or closed.
    #[must_use]
    pub fn drop_count(&self) -> u64 {
        self.dropped_messages.load(Ordering::Relaxed)
    }
}
