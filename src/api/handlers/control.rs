//! Direct control handlers: one command per request, no sequencing.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use super::parse_character;
use crate::api::dto::{
    EyesParams, EyesResponse, HeadParams, HeadResponse, LipParams, LipResponse, LookParams,
    LookResponse, PupilParams, PupilResponse, ResetResponse, RoastLevelParams,
    RoastLevelResponse, TalkParams, TalkResponse, truthy,
};
use crate::app_state::AppState;
use crate::domain::{
    Command, EyeState, clamp_head_angle, clamp_mouth_shape, clamp_pupil_x, clamp_pupil_y,
    clamp_roast_level,
};
use crate::error::{ErrorResponse, RelayError};
use crate::sequence::gestures::LookDirection;

/// `GET /{character}/lip` — Set a mouth shape.
///
/// # Errors
///
/// Returns [`RelayError::InvalidRequest`] for an unknown character.
#[utoipa::path(
    get,
    path = "/{character}/lip",
    tag = "Control",
    summary = "Set mouth shape",
    description = "Sets the character's `lipShape` input. The shape is rounded and clamped to 0..=7.",
    params(
        ("character" = String, Path, description = "`terry` or `nigel`"),
        LipParams,
    ),
    responses(
        (status = 200, description = "Command dispatched", body = LipResponse),
        (status = 400, description = "Unknown character or non-numeric shape", body = ErrorResponse),
    )
)]
pub async fn set_lip(
    State(state): State<AppState>,
    Path(character): Path<String>,
    Query(params): Query<LipParams>,
) -> Result<impl IntoResponse, RelayError> {
    let character = parse_character(&character)?;
    let shape = clamp_mouth_shape(params.shape.unwrap_or_default());
    let sent = state.dispatcher.publish(&Command::mouth(character, shape));
    Ok(Json(LipResponse { sent, shape }))
}

/// `GET /{character}/head` — Turn the head.
///
/// # Errors
///
/// Returns [`RelayError::InvalidRequest`] for an unknown character.
#[utoipa::path(
    get,
    path = "/{character}/head",
    tag = "Control",
    summary = "Turn head",
    description = "Sets the character's head-turn input. The angle is clamped to [-40, 40] degrees.",
    params(
        ("character" = String, Path, description = "`terry` or `nigel`"),
        HeadParams,
    ),
    responses(
        (status = 200, description = "Command dispatched", body = HeadResponse),
        (status = 400, description = "Unknown character or non-numeric angle", body = ErrorResponse),
    )
)]
pub async fn set_head(
    State(state): State<AppState>,
    Path(character): Path<String>,
    Query(params): Query<HeadParams>,
) -> Result<impl IntoResponse, RelayError> {
    let character = parse_character(&character)?;
    let angle = clamp_head_angle(params.angle.unwrap_or_default());
    let sent = state.dispatcher.publish(&Command::head(character, angle));
    Ok(Json(HeadResponse { sent, angle }))
}

/// `GET /{character}/talk` — Toggle the talking loop.
///
/// # Errors
///
/// Returns [`RelayError::InvalidRequest`] for an unknown character.
#[utoipa::path(
    get,
    path = "/{character}/talk",
    tag = "Control",
    summary = "Toggle talking",
    description = "Sets `isTalking`. Only `on=true` or `on=1` turns it on.",
    params(
        ("character" = String, Path, description = "`terry` or `nigel`"),
        TalkParams,
    ),
    responses(
        (status = 200, description = "Command dispatched", body = TalkResponse),
        (status = 400, description = "Unknown character", body = ErrorResponse),
    )
)]
pub async fn set_talk(
    State(state): State<AppState>,
    Path(character): Path<String>,
    Query(params): Query<TalkParams>,
) -> Result<impl IntoResponse, RelayError> {
    let character = parse_character(&character)?;
    let talking = truthy(params.on.as_deref());
    let sent = state
        .dispatcher
        .publish(&Command::talking(character, talking));
    Ok(Json(TalkResponse { sent, talking }))
}

/// `GET /{character}/eyes` — Set the eye state.
///
/// # Errors
///
/// Returns [`RelayError::InvalidRequest`] for an unknown character or eye
/// state.
#[utoipa::path(
    get,
    path = "/{character}/eyes",
    tag = "Control",
    summary = "Set eyes",
    description = "Sets the character's eye input. Accepts a state name or its index; defaults to open.",
    params(
        ("character" = String, Path, description = "`terry` or `nigel`"),
        EyesParams,
    ),
    responses(
        (status = 200, description = "Command dispatched", body = EyesResponse),
        (status = 400, description = "Unknown character or eye state", body = ErrorResponse),
    )
)]
pub async fn set_eyes(
    State(state): State<AppState>,
    Path(character): Path<String>,
    Query(params): Query<EyesParams>,
) -> Result<impl IntoResponse, RelayError> {
    let character = parse_character(&character)?;
    let eyes = match params.state.as_deref() {
        Some(raw) => raw.parse::<EyeState>().map_err(RelayError::InvalidRequest)?,
        None => EyeState::Open,
    };
    let sent = state.dispatcher.publish(&Command::eyes(character, eyes));
    Ok(Json(EyesResponse {
        sent,
        eyes: eyes.name().to_string(),
    }))
}

/// `GET /{character}/roast` — Set the roast attitude.
///
/// # Errors
///
/// Returns [`RelayError::InvalidRequest`] for an unknown character.
#[utoipa::path(
    get,
    path = "/{character}/roast",
    tag = "Control",
    summary = "Set roast attitude",
    description = "Sets the character's roast input: 0 chill, 1 smirk, 2 roast.",
    params(
        ("character" = String, Path, description = "`terry` or `nigel`"),
        RoastLevelParams,
    ),
    responses(
        (status = 200, description = "Command dispatched", body = RoastLevelResponse),
        (status = 400, description = "Unknown character or non-numeric level", body = ErrorResponse),
    )
)]
pub async fn set_roast_level(
    State(state): State<AppState>,
    Path(character): Path<String>,
    Query(params): Query<RoastLevelParams>,
) -> Result<impl IntoResponse, RelayError> {
    let character = parse_character(&character)?;
    let level = clamp_roast_level(params.level.unwrap_or_default());
    let sent = state
        .dispatcher
        .publish(&Command::roast_level(character, level));
    Ok(Json(RoastLevelResponse { sent, roast: level }))
}

/// `GET /pupils` — Move the shared gaze.
#[utoipa::path(
    get,
    path = "/pupils",
    tag = "Control",
    summary = "Move pupils",
    description = "Moves both characters' pupils. x is clamped to [-20, 20], y to [-10, 10].",
    params(PupilParams),
    responses(
        (status = 200, description = "Command dispatched", body = PupilResponse),
    )
)]
pub async fn set_pupils(
    State(state): State<AppState>,
    Query(params): Query<PupilParams>,
) -> impl IntoResponse {
    let x = clamp_pupil_x(params.x.unwrap_or_default());
    let y = clamp_pupil_y(params.y.unwrap_or_default());
    let sent = state.dispatcher.publish(&Command::pupil(x, y));
    Json(PupilResponse { sent, x, y })
}

/// `GET /look` — Look in a named direction.
#[utoipa::path(
    get,
    path = "/look",
    tag = "Control",
    summary = "Look in a direction",
    description = "Moves the shared gaze to a preset. Unknown directions look at the center.",
    params(LookParams),
    responses(
        (status = 200, description = "Command dispatched", body = LookResponse),
    )
)]
pub async fn look(State(state): State<AppState>, Query(params): Query<LookParams>) -> impl IntoResponse {
    let direction = params
        .direction
        .as_deref()
        .and_then(|d| d.parse::<LookDirection>().ok())
        .unwrap_or_default();
    let (x, y) = direction.offset();
    let sent = state.dispatcher.publish(&direction.command());
    Json(LookResponse {
        sent,
        direction,
        x,
        y,
    })
}

/// `GET /reset` — Return both characters to neutral.
#[utoipa::path(
    get,
    path = "/reset",
    tag = "Control",
    summary = "Reset to neutral",
    description = "Publishes the neutral reset burst and returns the mirrored state afterwards.",
    responses(
        (status = 200, description = "Reset applied", body = ResetResponse),
    )
)]
pub async fn reset(State(state): State<AppState>) -> impl IntoResponse {
    let _ = state.dispatcher.reset();
    state.dispatcher.reset_mirror();
    Json(ResetResponse {
        reset: true,
        state: state.dispatcher.snapshot(),
    })
}

/// Direct control routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/{character}/lip", get(set_lip))
        .route("/{character}/head", get(set_head))
        .route("/{character}/talk", get(set_talk))
        .route("/{character}/eyes", get(set_eyes))
        .route("/{character}/roast", get(set_roast_level))
        .route("/pupils", get(set_pupils))
        .route("/look", get(look))
        .route("/reset", get(reset))
}
