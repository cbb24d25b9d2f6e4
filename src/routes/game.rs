use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        common::TurnSummary,
        game::{
            AttachRecordingRequest, GuessResponse, StartGameRequest, StartGameResponse,
            SubmitGuessRequest, TimeoutRequest, TurnPromptRequest,
        },
    },
    error::AppError,
    services::{game_service, turn_service},
    state::SharedState,
};

/// Routes driving an active game: starting, guessing, timeouts, and the
/// storyteller's turn preparation.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/sessions/{id}/start", post(start_game))
        .route("/sessions/{id}/timeout", post(auto_submit_timeout))
        .route("/turns/{id}/guess", post(submit_guess))
        .route("/turns/{id}/prompt", post(set_turn_prompt))
        .route("/turns/{id}/recording", post(attach_recording))
}

/// Start the game, freezing the roster and scheduling one round per player.
#[utoipa::path(
    post,
    path = "/sessions/{id}/start",
    tag = "game",
    params(("id" = Uuid, Path, description = "Session identifier")),
    request_body = StartGameRequest,
    responses(
        (status = 200, description = "Game started", body = StartGameResponse),
        (status = 404, description = "Unknown session"),
        (status = 409, description = "Session is not waiting or has no players")
    )
)]
pub async fn start_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<StartGameRequest>,
) -> Result<Json<StartGameResponse>, AppError> {
    let started = game_service::start_game(&state, id, payload).await?;
    Ok(Json(started))
}

/// Submit a guess for a turn.
#[utoipa::path(
    post,
    path = "/turns/{id}/guess",
    tag = "game",
    params(("id" = Uuid, Path, description = "Turn identifier")),
    request_body = SubmitGuessRequest,
    responses(
        (status = 200, description = "Guess recorded (or absorbed as a retry)", body = GuessResponse),
        (status = 404, description = "Unknown turn or player"),
        (status = 409, description = "Turn closed, wrong round, or storyteller guessing")
    )
)]
pub async fn submit_guess(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SubmitGuessRequest>,
) -> Result<Json<GuessResponse>, AppError> {
    payload.validate()?;
    let outcome = turn_service::submit_guess(&state, id, payload).await?;
    Ok(Json(outcome))
}

/// Auto-submit a timeout answer for a player who ran out of time.
#[utoipa::path(
    post,
    path = "/sessions/{id}/timeout",
    tag = "game",
    params(("id" = Uuid, Path, description = "Session identifier")),
    request_body = TimeoutRequest,
    responses(
        (status = 200, description = "Timeout recorded (or absorbed as a retry)", body = GuessResponse),
        (status = 404, description = "Unknown session, round, or player")
    )
)]
pub async fn auto_submit_timeout(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TimeoutRequest>,
) -> Result<Json<GuessResponse>, AppError> {
    let outcome = turn_service::auto_submit_timeout(&state, id, payload).await?;
    Ok(Json(outcome))
}

/// Set the storyteller's theme and secret element for their turn.
#[utoipa::path(
    post,
    path = "/turns/{id}/prompt",
    tag = "game",
    params(("id" = Uuid, Path, description = "Turn identifier")),
    request_body = TurnPromptRequest,
    responses(
        (status = 200, description = "Prompt set", body = TurnSummary),
        (status = 404, description = "Unknown turn"),
        (status = 409, description = "Not the storyteller, or the turn is not playable")
    )
)]
pub async fn set_turn_prompt(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TurnPromptRequest>,
) -> Result<Json<TurnSummary>, AppError> {
    payload.validate()?;
    let summary = turn_service::set_turn_prompt(&state, id, payload).await?;
    Ok(Json(summary))
}

/// Attach the storyteller's recording reference to their turn.
#[utoipa::path(
    post,
    path = "/turns/{id}/recording",
    tag = "game",
    params(("id" = Uuid, Path, description = "Turn identifier")),
    request_body = AttachRecordingRequest,
    responses(
        (status = 200, description = "Recording attached", body = TurnSummary),
        (status = 404, description = "Unknown turn"),
        (status = 409, description = "Not the storyteller, or the turn is not playable")
    )
)]
pub async fn attach_recording(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AttachRecordingRequest>,
) -> Result<Json<TurnSummary>, AppError> {
    payload.validate()?;
    let summary = turn_service::attach_recording(&state, id, payload).await?;
    Ok(Json(summary))
}
