//! Timeline animation, bone editing, and roast submission handlers.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Form, Json, Router};

use super::parse_character;
use crate::api::dto::{
    AnimationParams, AnimationResponse, BoneParams, BoneResponse, BonesResponse,
    ListAnimationsResponse, SubmitForm, SubmitResponse,
};
use crate::app_state::AppState;
use crate::domain::{Character, Command};
use crate::error::{ErrorResponse, RelayError};

/// `GET /anims` — Ask the renderer to log its animations.
#[utoipa::path(
    get,
    path = "/anims",
    tag = "Animations",
    summary = "List animations",
    description = "Asks the renderer to print its timeline animation names to its own log.",
    responses(
        (status = 200, description = "Request dispatched", body = ListAnimationsResponse),
    )
)]
pub async fn list_animations(State(state): State<AppState>) -> impl IntoResponse {
    let requested = state.dispatcher.publish(&Command::ListAnimations);
    Json(ListAnimationsResponse {
        requested,
        note: "Check Flutter logs for animation list".to_string(),
    })
}

/// `GET /anim/play` — Play a timeline animation.
///
/// # Errors
///
/// Returns [`RelayError::MissingParameter`] without a name.
#[utoipa::path(
    get,
    path = "/anim/play",
    tag = "Animations",
    summary = "Play animation",
    description = "Plays a named timeline animation on files without state machine inputs.",
    params(AnimationParams),
    responses(
        (status = 200, description = "Command dispatched", body = AnimationResponse),
        (status = 400, description = "Name missing", body = ErrorResponse),
    )
)]
pub async fn play_animation(
    State(state): State<AppState>,
    Query(params): Query<AnimationParams>,
) -> Result<impl IntoResponse, RelayError> {
    let name = params.name.ok_or(RelayError::MissingParameter("name"))?;
    let sent = state
        .dispatcher
        .publish(&Command::PlayAnimation { name: name.clone() });
    Ok(Json(AnimationResponse {
        sent,
        animation: name,
        action: "play".to_string(),
    }))
}

/// `GET /anim/stop` — Stop a timeline animation.
///
/// # Errors
///
/// Returns [`RelayError::MissingParameter`] without a name.
#[utoipa::path(
    get,
    path = "/anim/stop",
    tag = "Animations",
    summary = "Stop animation",
    description = "Stops a named timeline animation.",
    params(AnimationParams),
    responses(
        (status = 200, description = "Command dispatched", body = AnimationResponse),
        (status = 400, description = "Name missing", body = ErrorResponse),
    )
)]
pub async fn stop_animation(
    State(state): State<AppState>,
    Query(params): Query<AnimationParams>,
) -> Result<impl IntoResponse, RelayError> {
    let name = params.name.ok_or(RelayError::MissingParameter("name"))?;
    let sent = state
        .dispatcher
        .publish(&Command::StopAnimation { name: name.clone() });
    Ok(Json(AnimationResponse {
        sent,
        animation: name,
        action: "stop".to_string(),
    }))
}

/// `GET /bones` — Enter bone edit mode.
#[utoipa::path(
    get,
    path = "/bones",
    tag = "Animations",
    summary = "Bone edit mode",
    description = "Switches the renderer into bone edit mode.",
    responses(
        (status = 200, description = "Command dispatched", body = BonesResponse),
    )
)]
pub async fn bone_edit(State(state): State<AppState>) -> impl IntoResponse {
    let sent = state.dispatcher.publish(&Command::BoneEdit);
    Json(BonesResponse {
        sent,
        mode: "bone_edit".to_string(),
    })
}

/// `GET /bone` — Rotate a named bone.
///
/// # Errors
///
/// Returns [`RelayError::MissingParameter`] without a name.
#[utoipa::path(
    get,
    path = "/bone",
    tag = "Animations",
    summary = "Rotate bone",
    description = "Rotates a named bone by `angle` degrees (default 0).",
    params(BoneParams),
    responses(
        (status = 200, description = "Command dispatched", body = BoneResponse),
        (status = 400, description = "Name missing or angle not numeric", body = ErrorResponse),
    )
)]
pub async fn rotate_bone(
    State(state): State<AppState>,
    Query(params): Query<BoneParams>,
) -> Result<impl IntoResponse, RelayError> {
    let name = params.name.ok_or(RelayError::MissingParameter("name"))?;
    let angle = params.angle.unwrap_or_default();
    let sent = state.dispatcher.publish(&Command::Bone {
        name: name.clone(),
        angle,
    });
    Ok(Json(BoneResponse { sent, name, angle }))
}

/// `POST /submit` — Queue a roast of a submitted target.
///
/// # Errors
///
/// Returns [`RelayError::InvalidRequest`] for an unknown character.
#[utoipa::path(
    post,
    path = "/submit",
    tag = "Animations",
    summary = "Submit a roast",
    description = "Accepts a form with the target's name and footage URL and forwards a `roast` command to the renderer.",
    request_body(content = SubmitForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Submission received", body = SubmitResponse),
        (status = 400, description = "Unknown character", body = ErrorResponse),
    )
)]
pub async fn submit(
    State(state): State<AppState>,
    Form(form): Form<SubmitForm>,
) -> Result<impl IntoResponse, RelayError> {
    let character = match non_blank(form.character) {
        Some(raw) => parse_character(&raw)?,
        None => Character::default(),
    };
    let target = non_blank(form.name).unwrap_or_else(|| "Unknown".to_string());
    let footage = non_blank(form.video).or_else(|| non_blank(form.video_url));

    tracing::info!(%target, footage = footage.as_deref().unwrap_or("-"), %character, "roast submitted");
    let sent = state.dispatcher.publish(&Command::Roast {
        target: target.clone(),
        footage,
        character,
    });

    Ok(Json(SubmitResponse {
        received: true,
        sent,
        target,
    }))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Animation routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/anims", get(list_animations))
        .route("/anim/play", get(play_animation))
        .route("/anim/stop", get(stop_animation))
        .route("/bones", get(bone_edit))
        .route("/bone", get(rotate_bone))
        .route("/submit", post(submit))
}
