//! Deferred removal of finished sessions.
//!
//! A completed game stays readable for a grace period so clients can render
//! the final scoreboard, then every row it owns is purged. Scheduled purges
//! are never cancelled; purging an already-deleted session is a no-op.

use tracing::{info, warn};
use uuid::Uuid;

use crate::{error::ServiceError, state::SharedState};

/// Spawn a detached task that purges the session after the configured delay.
pub fn schedule_session_cleanup(state: &SharedState, session_id: Uuid) {
    let state = state.clone();
    let delay = state.config().cleanup_delay();
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        if let Err(err) = purge_session(&state, session_id).await {
            warn!(%session_id, error = %err, "deferred session cleanup failed");
        }
    });
}

/// Delete a session and everything it owns: guesses first, then turns,
/// players, the session row, and finally its realtime hub.
pub async fn purge_session(state: &SharedState, session_id: Uuid) -> Result<(), ServiceError> {
    let store = state.require_session_store().await?;

    let turns = store.list_turns(session_id).await?;
    let turn_ids: Vec<Uuid> = turns.iter().map(|t| t.id).collect();
    let guesses = store.delete_guesses(turn_ids).await?;
    let turns = store.delete_turns(session_id).await?;
    let players = store.delete_players(session_id).await?;
    let existed = store.delete_session(session_id).await?;
    state.drop_session_events(session_id);

    if existed {
        info!(%session_id, guesses, turns, players, "session purged");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::session_store::memory::MemorySessionStore,
        dto::{
            game::StartGameRequest,
            lobby::{CreateLobbyRequest, JoinLobbyRequest},
        },
        services::{game_service, lobby_service},
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
    async fn purge_removes_every_row_and_is_idempotent() {
        let state = test_state().await;
        let lobby = lobby_service::create_lobby(
            &state,
            CreateLobbyRequest {
                display_name: "host".into(),
            },
        )
        .await
        .unwrap();
        lobby_service::join_lobby(
            &state,
            JoinLobbyRequest {
                lobby_code: lobby.session.lobby_code.clone(),
                display_name: "guest".into(),
            },
        )
        .await
        .unwrap();
        let session_id = lobby.session.id;
        game_service::start_game(&state, session_id, StartGameRequest::default())
            .await
            .unwrap();

        purge_session(&state, session_id).await.unwrap();

        let store = state.session_store().await.unwrap();
        assert!(store.find_session(session_id).await.unwrap().is_none());
        assert!(store.list_players(session_id).await.unwrap().is_empty());
        assert!(store.list_turns(session_id).await.unwrap().is_empty());

        // Purging again must be a quiet no-op.
        purge_session(&state, session_id).await.unwrap();
    }
}
