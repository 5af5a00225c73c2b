//! Command dispatcher: mirrors every command and delivers it to the
//! renderer, the observers, or both.

use std::sync::Arc;

use crate::domain::{Command, ConnectionRegistry, ControlState, StateMirror};
use crate::sequence::CommandSink;

/// Delivery coordinator for outbound commands.
///
/// Every method follows the same pattern: update the [`StateMirror`] →
/// serialize once → queue on each target connection. Delivery is
/// best-effort; an absent or saturated target is reported, never retried.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<ConnectionRegistry>,
    mirror: Arc<StateMirror>,
}

impl Dispatcher {
    /// Creates a dispatcher over the given registry and mirror.
    #[must_use]
    pub fn new(registry: Arc<ConnectionRegistry>, mirror: Arc<StateMirror>) -> Self {
        Self { registry, mirror }
    }

    /// Returns the connection registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Returns a copy of the mirrored state.
    #[must_use]
    pub fn snapshot(&self) -> ControlState {
        self.mirror.snapshot()
    }

    /// Sends a command to the primary connection only.
    ///
    /// Returns `false` when no renderer is connected or its queue rejected
    /// the frame.
    pub fn send_unicast(&self, command: &Command) -> bool {
        self.mirror.apply(command);
        match serialize(command) {
            Some(json) => self.deliver_primary(command, &json),
            None => false,
        }
    }

    /// Sends a command to every open observer connection.
    ///
    /// Returns the number of observers the frame was queued for. Observers
    /// that closed mid-broadcast are skipped.
    pub fn send_broadcast(&self, command: &Command) -> usize {
        self.mirror.apply(command);
        match serialize(command) {
            Some(json) => self.deliver_observers(&json),
            None => 0,
        }
    }

    /// Sends a command to the renderer and mirrors it to every observer.
    ///
    /// Returns whether the renderer received it.
    pub fn publish(&self, command: &Command) -> bool {
        self.mirror.apply(command);
        let Some(json) = serialize(command) else {
            return false;
        };
        let delivered = self.deliver_primary(command, &json);
        let _ = self.deliver_observers(&json);
        delivered
    }

    /// Publishes the neutral reset burst.
    ///
    /// Returns whether every command of the burst reached the renderer.
    pub fn reset(&self) -> bool {
        Command::neutral_reset()
            .iter()
            .fold(true, |all, command| self.publish(command) && all)
    }

    /// Restores the mirror to neutral defaults without sending anything.
    pub fn reset_mirror(&self) {
        self.mirror.reset();
    }

    fn deliver_primary(&self, command: &Command, json: &Arc<str>) -> bool {
        let Some(primary) = self.registry.primary() else {
            tracing::debug!(command = command.kind(), input = ?command.input(), "no renderer connected");
            return false;
        };
        let sent = primary.send_text(Arc::clone(json));
        if !sent {
            tracing::warn!(conn_id = %primary.id(), command = command.kind(), "renderer queue rejected command");
        }
        sent
    }

    fn deliver_observers(&self, json: &Arc<str>) -> usize {
        self.registry
            .observers()
            .iter()
            .filter(|conn| conn.is_open() && conn.send_text(Arc::clone(json)))
            .count()
    }
}

impl CommandSink for Dispatcher {
    fn submit(&self, command: Command) -> bool {
        self.publish(&command)
    }
}

fn serialize(command: &Command) -> Option<Arc<str>> {
    match command.to_json() {
        Ok(json) => Some(Arc::from(json)),
        Err(e) => {
            tracing::warn!(command = command.kind(), error = %e, "failed to serialize command");
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{Character, ClientConnection, ConnectionId, Outbound};
    use tokio::sync::mpsc;

    struct Fixture {
        dispatcher: Dispatcher,
        registry: Arc<ConnectionRegistry>,
    }

    fn make_fixture() -> Fixture {
        let mirror = Arc::new(StateMirror::new());
        let registry = Arc::new(ConnectionRegistry::new(Arc::clone(&mirror)));
        Fixture {
            dispatcher: Dispatcher::new(Arc::clone(&registry), mirror),
            registry,
        }
    }

    fn connect(registry: &ConnectionRegistry) -> (Arc<ClientConnection>, mpsc::Receiver<Outbound>) {
        let (tx, rx) = mpsc::channel(64);
        let conn = Arc::new(ClientConnection::new(ConnectionId::new(), tx));
        registry.register(Arc::clone(&conn));
        (conn, rx)
    }

    fn texts(rx: &mut mpsc::Receiver<Outbound>) -> Vec<String> {
        let mut out = Vec::new();
        while let Ok(frame) = rx.try_recv() {
            if let Outbound::Text(text) = frame {
                out.push(text.to_string());
            }
        }
        out
    }

    #[test]
    fn unicast_without_renderer_is_not_delivered_but_mirrored() {
        let fx = make_fixture();
        let sent = fx.dispatcher.send_unicast(&Command::head(Character::Terry, 99.0));
        assert!(!sent);
        assert!((fx.dispatcher.snapshot().terry.head_angle - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unicast_reaches_primary_only() {
        let fx = make_fixture();
        let (renderer, mut renderer_rx) = connect(&fx.registry);
        let (watcher, mut watcher_rx) = connect(&fx.registry);
        fx.registry.promote_primary(renderer.id());
        fx.registry.promote_observer(watcher.id());
        let _ = texts(&mut renderer_rx);
        let _ = texts(&mut watcher_rx);

        assert!(fx.dispatcher.send_unicast(&Command::mouth(Character::Terry, 2)));
        assert_eq!(texts(&mut renderer_rx).len(), 1);
        assert!(texts(&mut watcher_rx).is_empty());
    }

    #[test]
    fn broadcast_skips_closed_observers() {
        let fx = make_fixture();
        let (a, mut a_rx) = connect(&fx.registry);
        let (b, _b_rx) = connect(&fx.registry);
        fx.registry.promote_observer(a.id());
        fx.registry.promote_observer(b.id());
        b.close();

        let count = fx.dispatcher.send_broadcast(&Command::pupil(1.0, 1.0));
        assert_eq!(count, 1);
        assert!(texts(&mut a_rx).iter().any(|t| t.contains(r#""input":"pupil""#)));
    }

    #[test]
    fn publish_reaches_renderer_and_observers() {
        let fx = make_fixture();
        let (renderer, mut renderer_rx) = connect(&fx.registry);
        let (watcher, mut watcher_rx) = connect(&fx.registry);
        fx.registry.promote_primary(renderer.id());
        fx.registry.promote_observer(watcher.id());
        let _ = texts(&mut renderer_rx);
        let _ = texts(&mut watcher_rx);

        assert!(fx.dispatcher.publish(&Command::talking(Character::Nigel, true)));
        assert_eq!(texts(&mut renderer_rx).len(), 1);
        assert_eq!(texts(&mut watcher_rx).len(), 1);
        assert!(fx.dispatcher.snapshot().nigel.talking);
    }

    #[test]
    fn reset_restores_neutral_state() {
        let fx = make_fixture();
        fx.dispatcher.publish(&Command::mouth(Character::Nigel, 6));
        fx.dispatcher.publish(&Command::pupil(-9.0, 3.0));
        assert!(!fx.dispatcher.reset());
        assert_eq!(fx.dispatcher.snapshot(), ControlState::default());
    }
}
