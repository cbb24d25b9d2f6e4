use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::dto::common::PlayerSummary;

/// Dispatched payload carried across the per-session SSE channel.
#[derive(Clone, Debug)]
pub struct ServerEvent {
    pub event: Option<String>,
    pub data: String,
}

impl ServerEvent {
    /// Build a raw event from an already-serialized data payload.
    pub fn new(event: Option<String>, data: String) -> Self {
        Self { event, data }
    }

    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

/// Initial metadata sent to an SSE client when it connects.
#[derive(Debug, Serialize, ToSchema)]
pub struct Handshake {
    /// Session whose events this stream carries.
    pub session_id: Uuid,
    /// Human-readable message confirming the subscription.
    pub message: String,
    /// Whether the backend is running without a storage backend connection.
    pub degraded: bool,
}

/// Broadcast when a player joins the lobby.
#[derive(Debug, Serialize, ToSchema)]
pub struct PlayerJoinedEvent {
    pub player: PlayerSummary,
}

/// Broadcast when the host starts the game.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameStartedEvent {
    pub round_number: u32,
    pub storyteller_id: Uuid,
    pub total_rounds: u32,
}

/// Broadcast when the storyteller has set their prompt. Carries the hint
/// only; the secret element never leaves the server.
#[derive(Debug, Serialize, ToSchema)]
pub struct TurnPromptSetEvent {
    pub turn_id: Uuid,
    pub round_number: u32,
    pub theme: String,
    pub hint: Option<String>,
}

/// Broadcast when the last outstanding guess closes a turn.
#[derive(Debug, Serialize, ToSchema)]
pub struct TurnCompletedEvent {
    pub turn_id: Uuid,
    pub round_number: u32,
}

/// Broadcast when the session moves to the next round.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoundAdvancedEvent {
    pub round_number: u32,
    pub storyteller_id: Uuid,
}

/// Broadcast when the final round closes and the game ends.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameCompletedEvent {
    pub winner: PlayerSummary,
    /// Final scoreboard ordered by turn_order.
    pub scores: Vec<PlayerSummary>,
}

/// Broadcast when the host closes the lobby and data is purged.
#[derive(Debug, Serialize, ToSchema)]
pub struct LobbyClosedEvent {
    pub session_id: Uuid,
}
