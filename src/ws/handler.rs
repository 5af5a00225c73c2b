//! Axum WebSocket upgrade handler.

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use serde::Deserialize;

use super::session::{reject, run_session};
use crate::api::auth::authorize;
use crate::app_state::AppState;

/// Query parameters of the upgrade request.
#[derive(Debug, Default, Deserialize)]
pub struct ConnectParams {
    /// Connection-level control token.
    pub token: Option<String>,
}

/// `GET /` and `GET /ws`: upgrade to a WebSocket.
///
/// A wrong token still upgrades, then closes with code 1008 so browser
/// clients can see why.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<ConnectParams>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let authorized = authorize(
        params.token.as_deref().unwrap_or_default(),
        &state.config.control_token,
    );

    ws.on_upgrade(move |socket| async move {
        if authorized {
            run_session(socket, state).await;
        } else {
            reject(socket).await;
        }
    })
}
