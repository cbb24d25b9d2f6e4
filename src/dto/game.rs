use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::dto::common::{SessionSummary, TurnSummary};

/// Payload used by the host to start the game.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct StartGameRequest {
    /// Optional audio pack chosen for this game.
    #[serde(default)]
    pub selected_audio_id: Option<String>,
}

/// Returned once the game has started.
#[derive(Debug, Serialize, ToSchema)]
pub struct StartGameResponse {
    pub session: SessionSummary,
    /// The round-1 turn; later rounds are pre-created alongside it.
    pub first_turn: TurnSummary,
}

/// A player's answer for the current turn.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SubmitGuessRequest {
    /// Guessing player; must not be the storyteller.
    pub player_id: Uuid,
    /// Guessed phrase.
    #[validate(length(min = 1, max = 200))]
    pub content: String,
}

/// Auto-submission fired when a player's guess timer elapses.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TimeoutRequest {
    /// Round whose turn timed out; resolved server-side to the turn row.
    pub round_number: u32,
    /// Player who ran out of time.
    pub player_id: Uuid,
    /// Free-form reason reported by the client timer, for logging only.
    #[serde(default)]
    pub reason: Option<String>,
}

/// Outcome of a guess or timeout submission.
#[derive(Debug, Serialize, ToSchema)]
pub struct GuessResponse {
    /// True when an earlier guess by this player already existed and the
    /// call was absorbed as an idempotent no-op.
    pub duplicate: bool,
    /// Points credited to the guesser for this submission.
    pub points_earned: u32,
    /// Whether this submission closed the turn.
    pub turn_completed: bool,
    /// Whether this submission ended the game.
    pub game_completed: bool,
}

/// Storyteller's theme/element selection for their turn.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct TurnPromptRequest {
    /// Must be the turn's storyteller.
    pub player_id: Uuid,
    /// Chosen theme, shown to guessers.
    #[validate(length(min = 1, max = 80))]
    pub theme: String,
    /// Secret phrase to be guessed; never broadcast.
    #[validate(length(min = 1, max = 120))]
    pub element: String,
}

/// Opaque reference to the storyteller's uploaded recording.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct AttachRecordingRequest {
    /// Must be the turn's storyteller.
    pub player_id: Uuid,
    /// Storage reference produced by the (external) upload flow.
    #[validate(length(min = 1, max = 256))]
    pub recording_id: String,
}
