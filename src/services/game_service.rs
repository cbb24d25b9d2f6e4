use std::time::SystemTime;

use uuid::Uuid;

use crate::{
    dao::models::{SessionStatus, TurnEntity},
    dto::{
        game::{StartGameRequest, StartGameResponse},
        lobby::LobbyStateResponse,
    },
    error::ServiceError,
    services::sse_events,
    state::SharedState,
};

/// Start the game: freeze the roster, pre-create one turn per player, and
/// flip the session to active.
pub async fn start_game(
    state: &SharedState,
    session_id: Uuid,
    request: StartGameRequest,
) -> Result<StartGameResponse, ServiceError> {
    let store = state.require_session_store().await?;

    let Some(mut session) = store.find_session(session_id).await? else {
        return Err(ServiceError::NotFound(format!(
            "session `{session_id}` not found"
        )));
    };
    if !session.status.may_become(SessionStatus::Active) {
        return Err(ServiceError::InvalidState(format!(
            "game cannot start from status {:?}",
            session.status
        )));
    }

    let players = store.list_players(session.id).await?;
    // A lone player would be the storyteller of every round with nobody to
    // guess, so no turn could ever complete.
    if players.len() < 2 {
        return Err(ServiceError::InvalidState(
            "at least two players are required to start".into(),
        ));
    }
    let first_storyteller = &players[0];
    let total_rounds = players.len() as u32;

    // One turn per player, round k told by the player seated at k. All rows
    // are written before the session flips so that an active session always
    // has its full schedule on disk.
    let turns: Vec<TurnEntity> = players
        .iter()
        .map(|player| TurnEntity {
            id: Uuid::new_v4(),
            session_id: session.id,
            round_number: player.turn_order,
            storyteller_id: player.id,
            theme: None,
            element: None,
            hint: None,
            recording_id: None,
            completed_at: None,
        })
        .collect();
    let first_turn = turns[0].clone();
    store.insert_turns(turns).await?;

    session.status = SessionStatus::Active;
    session.current_round = 1;
    session.total_rounds = total_rounds;
    session.current_storyteller_id = Some(first_storyteller.id);
    session.selected_audio_id = request.selected_audio_id;
    session.started_at = Some(SystemTime::now());
    store.update_session(session.clone()).await?;

    sse_events::broadcast_game_started(state, session.id, first_storyteller.id, total_rounds);

    Ok(StartGameResponse {
        session: session.into(),
        first_turn: first_turn.into(),
    })
}

/// Full snapshot of a session: players by seat and turns by round.
pub async fn get_lobby_state(
    state: &SharedState,
    session_id: Uuid,
) -> Result<LobbyStateResponse, ServiceError> {
    let store = state.require_session_store().await?;

    let Some(session) = store.find_session(session_id).await? else {
        return Err(ServiceError::NotFound(format!(
            "session `{session_id}` not found"
        )));
    };
    let players = store.list_players(session.id).await?;
    let turns = store.list_turns(session.id).await?;

    Ok(LobbyStateResponse {
        session: session.into(),
        players: players.into_iter().map(Into::into).collect(),
        turns: turns.into_iter().map(Into::into).collect(),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::session_store::memory::MemorySessionStore,
        dto::lobby::CreateLobbyRequest,
        services::lobby_service,
        state::{AppState, SharedState},
    };

    async fn test_state() -> SharedState {
        let state = AppState::new(AppConfig::default());
        state
            .install_session_store(Arc::new(MemorySessionStore::default()))
            .await;
        state
    }

    #[tokio::test]
    async fn solo_lobby_cannot_start() {
        let state = test_state().await;
        let lobby = lobby_service::create_lobby(
            &state,
            CreateLobbyRequest {
                display_name: "host".into(),
            },
        )
        .await
        .unwrap();

        let err = start_game(&state, lobby.session.id, StartGameRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));

        // The lobby is untouched: still waiting, no turns pre-created.
        let snapshot = get_lobby_state(&state, lobby.session.id).await.unwrap();
        assert_eq!(snapshot.session.status, SessionStatus::Waiting);
        assert!(snapshot.turns.is_empty());
    }
}
