//! System endpoints: health check and relay status.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::dto::StatusResponse;
use crate::app_state::AppState;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
}

/// `GET /health` — Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, and current timestamp. Never requires a token.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// `GET /status` — Connection and state overview.
#[utoipa::path(
    get,
    path = "/status",
    tag = "System",
    summary = "Relay status",
    description = "Reports whether a renderer is connected, how many observers are, the mirrored control state, and the running sequences.",
    responses(
        (status = 200, description = "Relay status", body = StatusResponse),
    )
)]
pub async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(StatusResponse {
        flutter: state.registry.has_primary(),
        web_clients: state.registry.observer_count(),
        state: state.dispatcher.snapshot(),
        sequences: state.sequencer.running(),
    })
}

/// Authenticated system routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/status", get(status_handler))
}

/// System routes that bypass authentication.
pub fn public_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_handler))
}
