//! Server lifecycle: heartbeat task, HTTP/WebSocket serving, and graceful
//! shutdown.

use std::future::Future;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::api;
use crate::app_state::AppState;
use crate::service::HeartbeatMonitor;

/// Serves the relay on `listener` until `shutdown` resolves.
///
/// On shutdown every running sequence is stopped (waiting up to the
/// configured shutdown timeout), the neutral reset burst is published, and
/// every client connection is closed so the server can drain.
///
/// # Errors
///
/// Returns an I/O error if the server fails while accepting connections.
pub async fn run(
    listener: TcpListener,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let heartbeat_cancel = CancellationToken::new();
    let monitor = HeartbeatMonitor::new(
        Arc::clone(&state.registry),
        state.config.heartbeat_interval,
    );
    let heartbeat = tokio::spawn(monitor.run(heartbeat_cancel.clone()));

    let app = api::build_router(state.clone());
    let drain_state = state.clone();
    let drain_cancel = heartbeat_cancel.clone();
    let result = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.await;
            tracing::info!("shutting down");
            drain(&drain_state).await;
            drain_cancel.cancel();
        })
        .await;

    heartbeat_cancel.cancel();
    let _ = heartbeat.await;
    tracing::info!("server stopped");
    result
}

/// Stops every sequence with a final reset, then closes all connections.
async fn drain(state: &AppState) {
    let stopped = state.sequencer.stop_all(true).await;
    let connections = state.registry.connections();
    tracing::info!(sequences = stopped, connections = connections.len(), "draining relay");
    for connection in connections {
        connection.close();
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::RelayConfig;

    #[tokio::test]
    async fn run_returns_after_shutdown_signal() {
        let Ok(listener) = TcpListener::bind("127.0.0.1:0").await else {
            panic!("bind failed");
        };
        let state = AppState::new(RelayConfig::default());
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let server = tokio::spawn(run(listener, state, async move {
            let _ = rx.await;
        }));

        let _ = tx.send(());
        let Ok(joined) = tokio::time::timeout(Duration::from_secs(5), server).await else {
            panic!("server did not stop");
        };
        let Ok(result) = joined else {
            panic!("server task panicked");
        };
        assert!(result.is_ok());
    }
}
