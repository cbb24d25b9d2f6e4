use serde::Deserialize;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::dto::{
    common::{PlayerSummary, SessionSummary, TurnSummary},
    validation::{validate_display_name, validate_lobby_code},
};

/// Payload used to open a fresh lobby.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateLobbyRequest {
    /// Display name of the host, who becomes player 1.
    #[validate(custom(function = validate_display_name))]
    pub display_name: String,
}

/// Payload used to join an existing lobby by code.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct JoinLobbyRequest {
    /// Six-character lobby code shown to the host.
    #[validate(custom(function = validate_lobby_code))]
    pub lobby_code: String,
    /// Display name of the joining player.
    #[validate(custom(function = validate_display_name))]
    pub display_name: String,
}

/// Payload used by the host to close a lobby and purge its data.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CloseLobbyRequest {
    /// Player requesting the close; must be the host.
    pub player_id: Uuid,
}

/// Returned when a lobby has been created or joined.
#[derive(Debug, Serialize, ToSchema)]
pub struct LobbyJoinedResponse {
    pub session: SessionSummary,
    pub player: PlayerSummary,
}

/// Full lobby/game snapshot used by clients to (re)render.
#[derive(Debug, Serialize, ToSchema)]
pub struct LobbyStateResponse {
    pub session: SessionSummary,
    /// Players ordered by turn_order.
    pub players: Vec<PlayerSummary>,
    /// Turns ordered by round_number; empty until the game starts.
    pub turns: Vec<TurnSummary>,
}
