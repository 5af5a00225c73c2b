//! Registry of live connections and their roles.
//!
//! [`ConnectionRegistry`] holds at most one primary connection (the
//! renderer) and any number of observers. A new connection starts
//! unclassified and is promoted by its first identifying message or by the
//! grace timer. Every promotion pushes a synchronization snapshot to the
//! promoted connection alone.
//!
//! # Concurrency
//!
//! Registry mutation happens under a single `parking_lot::RwLock`; the lock
//! is never held across an await point or while sending.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use utoipa::ToSchema;

use super::command::Command;
use super::connection::ClientConnection;
use super::control_state::StateMirror;
use super::ConnectionId;

/// Role of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionRole {
    /// Accepted, not yet identified.
    Unclassified,
    /// The renderer eligible for unicast commands.
    Primary,
    /// A broadcast-only listener.
    Observer,
}

impl ConnectionRole {
    /// Lower-case name for log fields.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unclassified => "unclassified",
            Self::Primary => "primary",
            Self::Observer => "observer",
        }
    }
}

/// Outcome of a request to make a connection primary.
#[derive(Debug)]
pub enum PrimaryPromotion {
    /// The connection now holds the primary slot. `displaced` is the previous
    /// primary, already closed and removed.
    Promoted {
        /// Previous primary connection, if any.
        displaced: Option<Arc<ClientConnection>>,
    },
    /// The connection was already primary; the snapshot was re-sent.
    Resynced,
    /// No such connection is registered.
    Unknown,
}

#[derive(Debug)]
struct Entry {
    connection: Arc<ClientConnection>,
    role: ConnectionRole,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<ConnectionId, Entry>,
    primary: Option<ConnectionId>,
}

/// Central store of every accepted connection.
#[derive(Debug)]
pub struct ConnectionRegistry {
    inner: RwLock<Inner>,
    mirror: Arc<StateMirror>,
}

impl ConnectionRegistry {
    /// Creates an empty registry that snapshots from `mirror`.
    #[must_use]
    pub fn new(mirror: Arc<StateMirror>) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            mirror,
        }
    }

    /// Adds a freshly accepted, unclassified connection.
    pub fn register(&self, connection: Arc<ClientConnection>) {
        let id = connection.id();
        let _ = self.inner.write().entries.insert(
            id,
            Entry {
                connection,
                role: ConnectionRole::Unclassified,
            },
        );
        tracing::debug!(conn_id = %id, "connection registered");
    }

    /// Makes `id` the primary connection, closing whichever connection held
    /// the slot before.
    pub fn promote_primary(&self, id: ConnectionId) -> PrimaryPromotion {
        let (connection, displaced) = {
            let mut inner = self.inner.write();
            if inner.primary == Some(id) {
                let connection = inner.entries.get(&id).map(|e| Arc::clone(&e.connection));
                drop(inner);
                if let Some(connection) = connection {
                    self.send_snapshot(&connection);
                    return PrimaryPromotion::Resynced;
                }
                return PrimaryPromotion::Unknown;
            }
            let Some(entry) = inner.entries.get_mut(&id) else {
                return PrimaryPromotion::Unknown;
            };
            entry.role = ConnectionRole::Primary;
            let connection = Arc::clone(&entry.connection);
            let previous = inner.primary.replace(id);
            let displaced = previous
                .and_then(|old| inner.entries.remove(&old))
                .map(|e| e.connection);
            (connection, displaced)
        };

        if let Some(old) = &displaced {
            tracing::warn!(conn_id = %old.id(), new_primary = %id, "primary displaced, closing");
            old.close();
        }
        tracing::info!(conn_id = %id, "renderer connected");
        self.send_snapshot(&connection);
        PrimaryPromotion::Promoted { displaced }
    }

    /// Classifies an unclassified connection as observer.
    ///
    /// Returns `false` if the connection is unknown or already classified.
    pub fn promote_observer(&self, id: ConnectionId) -> bool {
        let connection = {
            let mut inner = self.inner.write();
            match inner.entries.get_mut(&id) {
                Some(entry) if entry.role == ConnectionRole::Unclassified => {
                    entry.role = ConnectionRole::Observer;
                    Arc::clone(&entry.connection)
                }
                _ => return false,
            }
        };
        tracing::info!(conn_id = %id, "observer connected");
        self.send_snapshot(&connection);
        true
    }

    fn send_snapshot(&self, connection: &ClientConnection) {
        let sync = Command::sync(self.mirror.snapshot());
        if !connection.send_command(&sync) {
            tracing::warn!(conn_id = %connection.id(), "failed to send sync snapshot");
        }
    }

    /// Removes a connection, vacating the primary slot if it held it.
    ///
    /// Returns the role the connection had, or `None` if it was not
    /// registered.
    pub fn remove(&self, id: ConnectionId) -> Option<ConnectionRole> {
        let mut inner = self.inner.write();
        let entry = inner.entries.remove(&id)?;
        if inner.primary == Some(id) {
            inner.primary = None;
        }
        Some(entry.role)
    }

    /// Returns the role of a registered connection.
    #[must_use]
    pub fn role(&self, id: ConnectionId) -> Option<ConnectionRole> {
        self.inner.read().entries.get(&id).map(|e| e.role)
    }

    /// Returns the primary connection if it exists and is open.
    #[must_use]
    pub fn primary(&self) -> Option<Arc<ClientConnection>> {
        let inner = self.inner.read();
        inner
            .primary
            .and_then(|id| inner.entries.get(&id))
            .map(|e| Arc::clone(&e.connection))
            .filter(|c| c.is_open())
    }

    /// Returns every observer connection.
    #[must_use]
    pub fn observers(&self) -> Vec<Arc<ClientConnection>> {
        self.inner
            .read()
            .entries
            .values()
            .filter(|e| e.role == ConnectionRole::Observer)
            .map(|e| Arc::clone(&e.connection))
            .collect()
    }

    /// Returns every registered connection regardless of role.
    #[must_use]
    pub fn connections(&self) -> Vec<Arc<ClientConnection>> {
        self.inner
            .read()
            .entries
            .values()
            .map(|e| Arc::clone(&e.connection))
            .collect()
    }

    /// Returns `true` if an open primary connection exists.
    #[must_use]
    pub fn has_primary(&self) -> bool {
        self.primary().is_some()
    }

    /// Number of observer connections.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.inner
            .read()
            .entries
            .values()
            .filter(|e| e.role == ConnectionRole::Observer)
            .count()
    }

    /// Number of registered connections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    /// Returns `true` if no connection is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().entries.is_empty()
    }
}
