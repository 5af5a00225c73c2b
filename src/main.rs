//! wfl-relay server entry point.
//!
//! Starts the Axum HTTP server with the control routes and the renderer
//! WebSocket endpoint.

use anyhow::Context;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use wfl_relay::app_state::AppState;
use wfl_relay::config::{LogFormat, RelayConfig};
use wfl_relay::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = RelayConfig::from_env();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }

    if config.is_exposed() {
        tracing::warn!(
            bind_host = %config.bind_host,
            "WFL_CONTROL_TOKEN is not set and the server is not bound to localhost; control endpoints are open to the network"
        );
    }

    let addr = config.bind_addr();
    let auth = if config.auth_enabled() { "enabled" } else { "disabled" };
    tracing::info!(%addr, auth, "starting wfl-relay");

    // Build application state
    let state = AppState::new(config);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "server listening");

    server::run(listener, state, shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C"),
        () = terminate => tracing::info!("received terminate signal"),
    }
}
