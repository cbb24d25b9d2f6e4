use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dao::models::{PlayerEntity, SessionEntity, SessionStatus, TurnEntity},
    dto::format_system_time,
};

/// Public projection of a session exposed to REST/SSE clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionSummary {
    pub id: Uuid,
    pub lobby_code: String,
    pub status: SessionStatus,
    pub current_round: u32,
    pub total_rounds: u32,
    pub current_storyteller_id: Option<Uuid>,
    pub selected_audio_id: Option<String>,
    pub created_at: String,
    pub started_at: Option<String>,
    pub ended_at: Option<String>,
}

/// Public projection of a player.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PlayerSummary {
    pub id: Uuid,
    pub display_name: String,
    pub score: u32,
    pub turn_order: u32,
    pub is_host: bool,
}

/// Public projection of a turn. The secret element is deliberately omitted;
/// guessers only ever see the theme and the generated hint.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TurnSummary {
    pub id: Uuid,
    pub round_number: u32,
    pub storyteller_id: Uuid,
    pub theme: Option<String>,
    pub hint: Option<String>,
    pub has_recording: bool,
    pub completed_at: Option<String>,
}

impl From<SessionEntity> for SessionSummary {
    fn from(session: SessionEntity) -> Self {
        Self {
            id: session.id,
            lobby_code: session.lobby_code,
            status: session.status,
            current_round: session.current_round,
            total_rounds: session.total_rounds,
            current_storyteller_id: session.current_storyteller_id,
            selected_audio_id: session.selected_audio_id,
            created_at: format_system_time(session.created_at),
            started_at: session.started_at.map(format_system_time),
            ended_at: session.ended_at.map(format_system_time),
        }
    }
}

impl From<PlayerEntity> for PlayerSummary {
    fn from(player: PlayerEntity) -> Self {
        Self {
            id: player.id,
            display_name: player.display_name,
            score: player.score,
            turn_order: player.turn_order,
            is_host: player.is_host,
        }
    }
}

impl From<TurnEntity> for TurnSummary {
    fn from(turn: TurnEntity) -> Self {
        Self {
            id: turn.id,
            round_number: turn.round_number,
            storyteller_id: turn.storyteller_id,
            theme: turn.theme,
            hint: turn.hint,
            has_recording: turn.recording_id.is_some(),
            completed_at: turn.completed_at.map(format_system_time),
        }
    }
}
