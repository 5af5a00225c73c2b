//! Admin handlers: renderer asset URL and reload.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Form, Json, Router};

use crate::api::dto::{ReloadResponse, RiveUrlForm, RiveUrlResponse};
use crate::app_state::{AdminConfig, AppState};
use crate::domain::Command;

/// `POST /admin/rive-url` — Point the renderer at a remote `.riv` file.
#[utoipa::path(
    post,
    path = "/admin/rive-url",
    tag = "Admin",
    summary = "Set Rive URL",
    description = "Stores the remote `.riv` URL and tells the renderer to load it. A blank URL switches back to the bundled file.",
    request_body(content = RiveUrlForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "URL stored", body = RiveUrlResponse),
    )
)]
pub async fn set_rive_url(
    State(state): State<AppState>,
    Form(form): Form<RiveUrlForm>,
) -> impl IntoResponse {
    let url = form
        .url
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty());
    state.admin.write().rive_url.clone_from(&url);

    tracing::info!(rive_url = url.as_deref().unwrap_or("local"), "rive url updated");
    let sent = state
        .dispatcher
        .publish(&Command::SetRiveUrl { url: url.clone() });
    Json(RiveUrlResponse {
        sent,
        rive_url: url,
    })
}

/// `GET /admin/reload-rive` — Reload the current `.riv` file.
#[utoipa::path(
    get,
    path = "/admin/reload-rive",
    tag = "Admin",
    summary = "Reload Rive file",
    description = "Tells the renderer to reload its `.riv` file from the configured URL.",
    responses(
        (status = 200, description = "Reload requested", body = ReloadResponse),
    )
)]
pub async fn reload_rive(State(state): State<AppState>) -> impl IntoResponse {
    let url = state.admin.read().rive_url.clone();
    let sent = state.dispatcher.publish(&Command::ReloadRive { url });
    let message = if sent {
        "Reload command sent!"
    } else {
        "Flutter not connected"
    };
    Json(ReloadResponse {
        sent,
        message: message.to_string(),
    })
}

/// `GET /admin/config` — Current admin settings.
#[utoipa::path(
    get,
    path = "/admin/config",
    tag = "Admin",
    summary = "Admin settings",
    description = "Returns the renderer URL, theme and reconnect setting.",
    responses(
        (status = 200, description = "Current settings", body = AdminConfig),
    )
)]
pub async fn admin_config(State(state): State<AppState>) -> impl IntoResponse {
    let config = state.admin.read().clone();
    Json(config)
}

/// Admin routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/rive-url", post(set_rive_url))
        .route("/admin/reload-rive", get(reload_rive))
        .route("/admin/config", get(admin_config))
}
