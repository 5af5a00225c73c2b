//! Sequence handlers: timed choreographies run through the sequencer.
//!
//! `/speak`, `/shake` and `/nod` answer once the sequence ends; the others
//! start a background run and answer immediately.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use super::parse_character;
use crate::api::dto::{
    DoneResponse, IdleStopParams, LipsyncRequest, NodParams, ReactParams, RoastRunRequest,
    SequenceStopParams, SequencesResponse, ShakeParams, SpeakParams, SpeakResponse,
    StartedResponse, StopResponse, truthy,
};
use crate::app_state::AppState;
use crate::domain::Character;
use crate::error::{ErrorResponse, RelayError};
use crate::sequence::gestures::{self, DEFAULT_SHAKE_INTENSITY};
use crate::sequence::reactions::{Reaction, UnknownReaction};
use crate::sequence::roast::RoastScript;
use crate::sequence::{idle, lipsync};
use crate::service::SequenceOutcome;
use crate::service::sequencer::names;

fn character_or_default(raw: Option<&str>) -> Result<Character, RelayError> {
    raw.map_or(Ok(Character::default()), parse_character)
}

/// `GET /speak` — Flap a character's mouth along some text.
///
/// # Errors
///
/// Returns [`RelayError::InvalidRequest`] for an unknown character.
#[utoipa::path(
    get,
    path = "/speak",
    tag = "Sequences",
    summary = "Speak text",
    description = "Plays one mouth shape per character of `text` (vowels 80 ms, l/m/n/r/s 50 ms, f/v/w 60 ms, others 40 ms) and answers when done.",
    params(SpeakParams),
    responses(
        (status = 200, description = "Speech finished or was interrupted", body = SpeakResponse),
        (status = 400, description = "Unknown character", body = ErrorResponse),
    )
)]
pub async fn speak(
    State(state): State<AppState>,
    Query(params): Query<SpeakParams>,
) -> Result<impl IntoResponse, RelayError> {
    let character = character_or_default(params.character.as_deref())?;
    let text = params.text.unwrap_or_default();
    let phonemes = text.chars().count();

    let ticket = state.sequencer.start(names::SPEAK, move |player| async move {
        lipsync::speak(player, character, text).await.map(|_| ())
    });
    let outcome = ticket.finished().await;

    Ok(Json(SpeakResponse {
        done: outcome == SequenceOutcome::Completed,
        phonemes,
    }))
}

/// `GET /shake` — Shake a character's head.
///
/// # Errors
///
/// Returns [`RelayError::InvalidRequest`] for an unknown character.
#[utoipa::path(
    get,
    path = "/shake",
    tag = "Sequences",
    summary = "Head shake",
    description = "Turns the head to ±intensity four times at 100 ms, then centers it. Answers when done.",
    params(ShakeParams),
    responses(
        (status = 200, description = "Shake finished or was interrupted", body = DoneResponse),
        (status = 400, description = "Unknown character or non-numeric intensity", body = ErrorResponse),
    )
)]
pub async fn shake(
    State(state): State<AppState>,
    Query(params): Query<ShakeParams>,
) -> Result<impl IntoResponse, RelayError> {
    let character = character_or_default(params.character.as_deref())?;
    let intensity = params.intensity.unwrap_or(DEFAULT_SHAKE_INTENSITY);

    let ticket = state.sequencer.start(names::GESTURE, move |player| {
        gestures::shake(player, character, intensity)
    });
    let outcome = ticket.finished().await;

    Ok(Json(DoneResponse {
        done: outcome == SequenceOutcome::Completed,
    }))
}

/// `GET /nod` — Nod using the shared gaze.
///
/// # Errors
///
/// Returns [`RelayError::InvalidRequest`] for an unknown character.
#[utoipa::path(
    get,
    path = "/nod",
    tag = "Sequences",
    summary = "Nod",
    description = "Moves the gaze down and up twice at 150 ms, then recenters it. Answers when done.",
    params(NodParams),
    responses(
        (status = 200, description = "Nod finished or was interrupted", body = DoneResponse),
        (status = 400, description = "Unknown character", body = ErrorResponse),
    )
)]
pub async fn nod(
    State(state): State<AppState>,
    Query(params): Query<NodParams>,
) -> Result<impl IntoResponse, RelayError> {
    let _ = character_or_default(params.character.as_deref())?;

    let ticket = state.sequencer.start(names::GESTURE, gestures::nod);
    let outcome = ticket.finished().await;

    Ok(Json(DoneResponse {
        done: outcome == SequenceOutcome::Completed,
    }))
}

/// `GET /react` — Play a named reaction in the background.
///
/// # Errors
///
/// Returns [`RelayError::MissingParameter`] without a name, or
/// [`RelayError::UnknownReaction`] (with the valid names) for an unknown one.
#[utoipa::path(
    get,
    path = "/react",
    tag = "Sequences",
    summary = "Play a reaction",
    description = "Starts a named reaction such as `terry_laugh` or `nigel_eyeroll`. A reaction already playing is replaced.",
    params(ReactParams),
    responses(
        (status = 200, description = "Reaction started", body = StartedResponse),
        (status = 400, description = "Missing or unknown reaction", body = ErrorResponse),
    )
)]
pub async fn react(
    State(state): State<AppState>,
    Query(params): Query<ReactParams>,
) -> Result<impl IntoResponse, RelayError> {
    let name = params.name.ok_or(RelayError::MissingParameter("name"))?;
    let reaction: Reaction = name.parse()?;

    let ticket = state
        .sequencer
        .start(names::REACTION, move |player| reaction.play(player));

    Ok(Json(StartedResponse {
        started: true,
        sequence: ticket.name().to_string(),
        detail: Some(reaction.name().to_string()),
        flutter: state.registry.has_primary(),
    }))
}

/// `POST /lipsync` — Play timed phoneme cues in the background.
///
/// # Errors
///
/// Returns [`RelayError::MissingParameter`] when `cues` is empty.
#[utoipa::path(
    post,
    path = "/lipsync",
    tag = "Sequences",
    summary = "Play lip-sync cues",
    description = "Plays `{time, phoneme}` cues (seconds from start, ARPAbet labels) as mouth shapes, bracketed by talking on and off.",
    request_body = LipsyncRequest,
    responses(
        (status = 200, description = "Playback started", body = StartedResponse),
        (status = 400, description = "No cues or malformed body", body = ErrorResponse),
    )
)]
pub async fn lipsync(
    State(state): State<AppState>,
    Json(req): Json<LipsyncRequest>,
) -> Result<impl IntoResponse, RelayError> {
    if req.cues.is_empty() {
        return Err(RelayError::MissingParameter("cues"));
    }
    let count = req.cues.len();
    let character = req.character;

    let ticket = state.sequencer.start(names::LIPSYNC, move |player| {
        lipsync::play(player, character, req.cues)
    });

    Ok(Json(StartedResponse {
        started: true,
        sequence: ticket.name().to_string(),
        detail: Some(format!("{count} cues for {character}")),
        flutter: state.registry.has_primary(),
    }))
}

/// `GET|POST /roast/run` — Run the full roast choreography in the
/// background.
#[utoipa::path(
    post,
    path = "/roast/run",
    tag = "Sequences",
    summary = "Run the roast",
    description = "Runs intro, shock, Terry's lines, Nigel's reaction, the closing beat and the outro in order. The JSON body is optional; `GET` uses the built-in lines.",
    request_body(content = RoastRunRequest, description = "Optional custom lines and closing beat"),
    responses(
        (status = 200, description = "Roast started", body = StartedResponse),
        (status = 400, description = "Malformed body", body = ErrorResponse),
    )
)]
pub async fn run_roast(
    State(state): State<AppState>,
    payload: Option<Json<RoastRunRequest>>,
) -> impl IntoResponse {
    let req = payload.map(|Json(req)| req).unwrap_or_default();
    let mut script = req
        .lines
        .map_or_else(RoastScript::default, RoastScript::with_lines);
    if let Some(beat) = req.closing {
        script = script.closing(beat);
    }
    let lines = script.lines.len();

    let ticket = state
        .sequencer
        .start(names::ROAST, move |player| script.play(player));

    Json(StartedResponse {
        started: true,
        sequence: ticket.name().to_string(),
        detail: Some(format!("{lines} lines")),
        flutter: state.registry.has_primary(),
    })
}

/// `GET /idle/start` — Start the ambient idle loops.
#[utoipa::path(
    get,
    path = "/idle/start",
    tag = "Sequences",
    summary = "Start idle motion",
    description = "Starts gaze wander, blinking, head sway and micro-expressions. Does nothing if idle is already running.",
    responses(
        (status = 200, description = "Idle running", body = StartedResponse),
    )
)]
pub async fn start_idle(State(state): State<AppState>) -> impl IntoResponse {
    let started = state
        .sequencer
        .start_unless_running(names::IDLE, idle::run)
        .is_some();
    Json(StartedResponse {
        started,
        sequence: names::IDLE.to_string(),
        detail: None,
        flutter: state.registry.has_primary(),
    })
}

/// `GET /idle/stop` — Stop the ambient idle loops.
#[utoipa::path(
    get,
    path = "/idle/stop",
    tag = "Sequences",
    summary = "Stop idle motion",
    description = "Stops idle motion at its next pause. With `reset=true` the neutral reset burst follows.",
    params(IdleStopParams),
    responses(
        (status = 200, description = "Idle stopped", body = StopResponse),
    )
)]
pub async fn stop_idle(
    State(state): State<AppState>,
    Query(params): Query<IdleStopParams>,
) -> impl IntoResponse {
    let reset = truthy(params.reset.as_deref());
    let stopped = state.sequencer.stop(names::IDLE, reset).await;
    Json(StopResponse {
        stopped: usize::from(stopped),
        reset,
    })
}

/// `GET /sequences` — List running sequences.
#[utoipa::path(
    get,
    path = "/sequences",
    tag = "Sequences",
    summary = "List sequences",
    description = "Returns the names of running sequences and every reaction `/react` accepts.",
    responses(
        (status = 200, description = "Sequence listing", body = SequencesResponse),
    )
)]
pub async fn list_sequences(State(state): State<AppState>) -> impl IntoResponse {
    Json(SequencesResponse {
        running: state.sequencer.running(),
        reactions: UnknownReaction::available()
            .into_iter()
            .map(str::to_string)
            .collect(),
    })
}

/// `GET /sequences/stop` — Stop one sequence or all of them.
#[utoipa::path(
    get,
    path = "/sequences/stop",
    tag = "Sequences",
    summary = "Stop sequences",
    description = "Stops the sequence named `name`, or every sequence when no name is given. With `reset=true` the neutral reset burst follows.",
    params(SequenceStopParams),
    responses(
        (status = 200, description = "Sequences stopped", body = StopResponse),
    )
)]
pub async fn stop_sequences(
    State(state): State<AppState>,
    Query(params): Query<SequenceStopParams>,
) -> impl IntoResponse {
    let reset = truthy(params.reset.as_deref());
    let stopped = match params.name.as_deref() {
        Some(name) => usize::from(state.sequencer.stop(name, reset).await),
        None => state.sequencer.stop_all(reset).await,
    };
    Json(StopResponse { stopped, reset })
}

/// Sequence routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/speak", get(speak))
        .route("/shake", get(shake))
        .route("/nod", get(nod))
        .route("/react", get(react))
        .route("/lipsync", post(lipsync))
        .route("/roast/run", get(run_roast).post(run_roast))
        .route("/idle/start", get(start_idle))
        .route("/idle/stop", get(stop_idle))
        .route("/sequences", get(list_sequences))
        .route("/sequences/stop", get(stop_sequences))
}
