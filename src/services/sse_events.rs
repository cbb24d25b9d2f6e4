use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::{
    dto::{
        common::PlayerSummary,
        sse::{
            GameCompletedEvent, GameStartedEvent, LobbyClosedEvent, PlayerJoinedEvent,
            RoundAdvancedEvent, ServerEvent, TurnCompletedEvent, TurnPromptSetEvent,
        },
    },
    state::SharedState,
};

const EVENT_PLAYER_JOINED: &str = "player_joined";
const EVENT_GAME_STARTED: &str = "game_started";
const EVENT_TURN_PROMPT_SET: &str = "turn_prompt_set";
const EVENT_TURN_COMPLETED: &str = "turn_completed";
const EVENT_ROUND_ADVANCED: &str = "round_advanced";
const EVENT_GAME_COMPLETED: &str = "game_completed";
const EVENT_LOBBY_CLOSED: &str = "lobby_closed";

/// Broadcast that a player has joined the lobby.
pub fn broadcast_player_joined(state: &SharedState, session_id: Uuid, player: PlayerSummary) {
    let payload = PlayerJoinedEvent { player };
    send_session_event(state, session_id, EVENT_PLAYER_JOINED, &payload);
}

/// Broadcast that the game has started with its first round.
pub fn broadcast_game_started(
    state: &SharedState,
    session_id: Uuid,
    storyteller_id: Uuid,
    total_rounds: u32,
) {
    let payload = GameStartedEvent {
        round_number: 1,
        storyteller_id,
        total_rounds,
    };
    send_session_event(state, session_id, EVENT_GAME_STARTED, &payload);
}

/// Broadcast the storyteller's prompt (theme + hint, never the element).
pub fn broadcast_turn_prompt_set(
    state: &SharedState,
    session_id: Uuid,
    turn_id: Uuid,
    round_number: u32,
    theme: String,
    hint: Option<String>,
) {
    let payload = TurnPromptSetEvent {
        turn_id,
        round_number,
        theme,
        hint,
    };
    send_session_event(state, session_id, EVENT_TURN_PROMPT_SET, &payload);
}

/// Broadcast that a turn has closed.
pub fn broadcast_turn_completed(
    state: &SharedState,
    session_id: Uuid,
    turn_id: Uuid,
    round_number: u32,
) {
    let payload = TurnCompletedEvent {
        turn_id,
        round_number,
    };
    send_session_event(state, session_id, EVENT_TURN_COMPLETED, &payload);
}

/// Broadcast that play has advanced to the next round.
pub fn broadcast_round_advanced(
    state: &SharedState,
    session_id: Uuid,
    round_number: u32,
    storyteller_id: Uuid,
) {
    let payload = RoundAdvancedEvent {
        round_number,
        storyteller_id,
    };
    send_session_event(state, session_id, EVENT_ROUND_ADVANCED, &payload);
}

/// Broadcast the final scoreboard and winner.
pub fn broadcast_game_completed(
    state: &SharedState,
    session_id: Uuid,
    winner: PlayerSummary,
    scores: Vec<PlayerSummary>,
) {
    let payload = GameCompletedEvent { winner, scores };
    send_session_event(state, session_id, EVENT_GAME_COMPLETED, &payload);
}

/// Broadcast that the host has closed the lobby.
pub fn broadcast_lobby_closed(state: &SharedState, session_id: Uuid) {
    let payload = LobbyClosedEvent { session_id };
    send_session_event(state, session_id, EVENT_LOBBY_CLOSED, &payload);
}

fn send_session_event(
    state: &SharedState,
    session_id: Uuid,
    event: &str,
    payload: &impl Serialize,
) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => state.session_events(session_id).broadcast(event),
        Err(err) => warn!(event, %session_id, error = %err, "failed to serialize SSE payload"),
    }
}
