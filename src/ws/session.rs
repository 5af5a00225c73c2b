//! WebSocket session lifecycle: handles a single connected client from
//! upgrade through disconnect.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::ws::{CloseFrame, Message, Utf8Bytes, WebSocket, close_code};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use super::messages::{InboundMessage, PONG, preview};
use crate::app_state::AppState;
use crate::domain::{ClientConnection, ConnectionId, ConnectionRole, Outbound, PrimaryPromotion};

/// How long the writer may take to flush its close frame.
const WRITER_DRAIN: Duration = Duration::from_secs(1);

/// Runs a session for an authorized client.
///
/// 1. Registers the connection as unclassified
/// 2. Forwards queued frames (text, ping, close) from a writer task
/// 3. Classifies the client by its first identifying message, or as an
///    observer once the grace window expires
/// 4. Marks the connection alive on every pong or application ping
/// 5. Deregisters on disconnect, eviction, or displacement
pub async fn run_session(socket: WebSocket, state: AppState) {
    let id = ConnectionId::new();
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (tx, mut rx) = mpsc::channel::<Outbound>(state.config.outbound_capacity);
    let connection = Arc::new(ClientConnection::new(id, tx));

    state.registry.register(Arc::clone(&connection));
    tracing::info!(conn_id = %id, "client connected");

    let writer_conn = Arc::clone(&connection);
    let writer = tokio::spawn(async move {
        loop {
            tokio::select! {
                frame = rx.recv() => {
                    let message = match frame {
                        Some(Outbound::Text(text)) => Message::text(text.to_string()),
                        Some(Outbound::Ping) => Message::Ping(Bytes::new()),
                        None => break,
                    };
                    if ws_tx.send(message).await.is_err() {
                        break;
                    }
                }
                () = writer_conn.closed() => {
                    while let Ok(Outbound::Text(text)) = rx.try_recv() {
                        if ws_tx.send(Message::text(text.to_string())).await.is_err() {
                            break;
                        }
                    }
                    let _ = ws_tx
                        .send(Message::Close(Some(CloseFrame {
                            code: close_code::NORMAL,
                            reason: Utf8Bytes::from_static("closing"),
                        })))
                        .await;
                    break;
                }
            }
        }
    });

    let grace = tokio::time::sleep(state.config.classify_grace);
    tokio::pin!(grace);
    let mut grace_elapsed = false;

    loop {
        tokio::select! {
            () = &mut grace, if !grace_elapsed => {
                grace_elapsed = true;
                if state.registry.role(id) == Some(ConnectionRole::Unclassified) {
                    tracing::debug!(conn_id = %id, "no identification within grace window");
                    let _ = state.registry.promote_observer(id);
                }
            }
            () = connection.closed() => break,
            frame = ws_rx.next() => match frame {
                Some(Ok(Message::Text(text))) => handle_text(&state, &connection, text.as_str()),
                Some(Ok(Message::Binary(data))) => match std::str::from_utf8(&data) {
                    Ok(text) => handle_text(&state, &connection, text),
                    Err(_) => tracing::debug!(conn_id = %id, len = data.len(), "discarding non-UTF8 binary frame"),
                },
                Some(Ok(Message::Pong(_))) => connection.mark_alive(),
                Some(Ok(Message::Ping(_))) => {}
                Some(Ok(Message::Close(_))) | None => break,
                Some(Err(e)) => {
                    tracing::debug!(conn_id = %id, error = %e, "socket error");
                    break;
                }
            }
        }
    }

    connection.close();
    let _ = tokio::time::timeout(WRITER_DRAIN, writer).await;

    match state.registry.remove(id) {
        Some(ConnectionRole::Primary) => tracing::info!(conn_id = %id, "renderer disconnected"),
        Some(role) => tracing::info!(conn_id = %id, role = role.as_str(), "client disconnected"),
        None => tracing::debug!(conn_id = %id, "connection already evicted"),
    }
}

/// Upgrades and immediately closes a connection that presented the wrong
/// token.
pub async fn reject(mut socket: WebSocket) {
    tracing::warn!("websocket rejected: bad token");
    let _ = socket
        .send(Message::Close(Some(CloseFrame {
            code: close_code::POLICY,
            reason: Utf8Bytes::from_static("Unauthorized"),
        })))
        .await;
}

fn handle_text(state: &AppState, connection: &ClientConnection, text: &str) {
    let id = connection.id();
    let message = match InboundMessage::parse(text) {
        Ok(message) => message,
        Err(e) => {
            tracing::debug!(conn_id = %id, error = %e, raw = preview(text), "discarding malformed message");
            return;
        }
    };

    match message {
        InboundMessage::Ping => {
            connection.mark_alive();
            if !connection.send_text(Arc::from(PONG)) {
                tracing::debug!(conn_id = %id, "pong not queued");
            }
        }
        InboundMessage::Status { rive_loaded: Some(_) } => {
            match state.registry.promote_primary(id) {
                PrimaryPromotion::Promoted { .. } => {}
                PrimaryPromotion::Resynced => {
                    tracing::debug!(conn_id = %id, "renderer status, snapshot re-sent");
                }
                PrimaryPromotion::Unknown => {
                    tracing::debug!(conn_id = %id, "status from deregistered connection");
                }
            }
        }
        InboundMessage::WebHello => {
            if !state.registry.promote_observer(id) {
                tracing::debug!(conn_id = %id, "repeated hello ignored");
            }
        }
        InboundMessage::Status { rive_loaded: None } | InboundMessage::Unknown => {
            tracing::debug!(conn_id = %id, raw = preview(text), "client message");
        }
    }
}
