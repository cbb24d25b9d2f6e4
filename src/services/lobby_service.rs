use std::time::SystemTime;

use rand::Rng;
use uuid::Uuid;

use crate::{
    dao::models::{PlayerEntity, SessionEntity, SessionStatus},
    dto::{
        lobby::{CloseLobbyRequest, CreateLobbyRequest, JoinLobbyRequest, LobbyJoinedResponse},
        validation::{LOBBY_CODE_ALPHABET, LOBBY_CODE_LEN},
    },
    error::ServiceError,
    services::{cleanup, sse_events},
    state::SharedState,
};

const CODE_GENERATION_ATTEMPTS: usize = 16;
const SEAT_ASSIGNMENT_ATTEMPTS: usize = 8;

/// Open a fresh lobby with the requester as host and player 1.
pub async fn create_lobby(
    state: &SharedState,
    request: CreateLobbyRequest,
) -> Result<LobbyJoinedResponse, ServiceError> {
    let store = state.require_session_store().await?;

    let mut lobby_code = None;
    for _ in 0..CODE_GENERATION_ATTEMPTS {
        let candidate = generate_lobby_code();
        if store.find_session_by_code(candidate.clone()).await?.is_none() {
            lobby_code = Some(candidate);
            break;
        }
    }
    let Some(lobby_code) = lobby_code else {
        return Err(ServiceError::InvalidState(
            "could not allocate an unused lobby code".into(),
        ));
    };

    let now = SystemTime::now();
    let session = SessionEntity {
        id: Uuid::new_v4(),
        lobby_code,
        status: SessionStatus::Waiting,
        current_round: 0,
        total_rounds: 0,
        current_storyteller_id: None,
        selected_audio_id: None,
        created_at: now,
        started_at: None,
        ended_at: None,
    };
    let host = PlayerEntity {
        id: Uuid::new_v4(),
        session_id: session.id,
        display_name: request.display_name.trim().to_owned(),
        score: 0,
        turn_order: 1,
        is_host: true,
        joined_at: now,
    };

    store.insert_session(session.clone()).await?;
    if !store.insert_player(host.clone()).await? {
        return Err(ServiceError::InvalidState(
            "seat 1 of a fresh lobby is already taken".into(),
        ));
    }

    Ok(LobbyJoinedResponse {
        session: session.into(),
        player: host.into(),
    })
}

/// Join an open lobby by its code, taking the next free seat.
pub async fn join_lobby(
    state: &SharedState,
    request: JoinLobbyRequest,
) -> Result<LobbyJoinedResponse, ServiceError> {
    let store = state.require_session_store().await?;

    let Some(session) = store.find_session_by_code(request.lobby_code.clone()).await? else {
        return Err(ServiceError::NotFound(format!(
            "no lobby with code `{}`",
            request.lobby_code
        )));
    };

    if session.status != SessionStatus::Waiting {
        return Err(ServiceError::InvalidState(
            "lobby is closed; the game has already started".into(),
        ));
    }

    // Seats stay dense because players can only join pre-game and never
    // leave individually; round k maps to the player seated at k. Seat
    // assignment is read-compute-write, so the store's insert-if-absent on
    // (session_id, turn_order) arbitrates racing joins and the loser
    // recomputes its seat.
    let mut joined = None;
    for _ in 0..SEAT_ASSIGNMENT_ATTEMPTS {
        let players = store.list_players(session.id).await?;
        if players.len() as u32 >= state.config().max_players() {
            return Err(ServiceError::InvalidState("lobby is full".into()));
        }

        let next_seat = players.iter().map(|p| p.turn_order).max().unwrap_or(0) + 1;
        let player = PlayerEntity {
            id: Uuid::new_v4(),
            session_id: session.id,
            display_name: request.display_name.trim().to_owned(),
            score: 0,
            turn_order: next_seat,
            is_host: false,
            joined_at: SystemTime::now(),
        };
        if store.insert_player(player.clone()).await? {
            joined = Some(player);
            break;
        }
    }
    let Some(player) = joined else {
        return Err(ServiceError::InvalidState(
            "could not assign a seat; the lobby is filling too quickly".into(),
        ));
    };

    sse_events::broadcast_player_joined(state, session.id, player.clone().into());

    Ok(LobbyJoinedResponse {
        session: session.into(),
        player: player.into(),
    })
}

/// Close a lobby on behalf of its host, purging the session and notifying
/// connected clients.
pub async fn close_lobby(
    state: &SharedState,
    session_id: Uuid,
    request: CloseLobbyRequest,
) -> Result<(), ServiceError> {
    let store = state.require_session_store().await?;

    let Some(session) = store.find_session(session_id).await? else {
        return Err(ServiceError::NotFound(format!(
            "session `{session_id}` not found"
        )));
    };

    let Some(requester) = store.find_player(request.player_id).await? else {
        return Err(ServiceError::NotFound(format!(
            "player `{}` not found",
            request.player_id
        )));
    };
    if requester.session_id != session.id || !requester.is_host {
        return Err(ServiceError::InvalidState(
            "only the host may close the lobby".into(),
        ));
    }

    sse_events::broadcast_lobby_closed(state, session.id);
    cleanup::purge_session(state, session.id).await?;
    Ok(())
}

fn generate_lobby_code() -> String {
    let mut rng = rand::rng();
    (0..LOBBY_CODE_LEN)
        .map(|_| {
            let index = rng.random_range(0..LOBBY_CODE_ALPHABET.len());
            LOBBY_CODE_ALPHABET[index] as char
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::session_store::memory::MemorySessionStore,
        dto::validation::validate_lobby_code,
        state::{AppState, SharedState},
    };

    async fn test_state() -> SharedState {
        let state = AppState::new(AppConfig::default());
        state
            .install_session_store(Arc::new(MemorySessionStore::default()))
            .await;
        state
    }

    #[test]
    fn generated_codes_pass_validation() {
        for _ in 0..100 {
            let code = generate_lobby_code();
            assert_eq!(code.len(), LOBBY_CODE_LEN);
            assert!(validate_lobby_code(&code).is_ok(), "bad code `{code}`");
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn parallel_joins_get_distinct_dense_seats() {
        let state = test_state().await;
        let lobby = create_lobby(
            &state,
            CreateLobbyRequest {
                display_name: "host".into(),
            },
        )
        .await
        .unwrap();

        // Six joins race on worker threads; losers of the seat write must
        // recompute instead of doubling up a turn_order.
        let mut tasks = Vec::new();
        for n in 0..6 {
            let state = state.clone();
            let lobby_code = lobby.session.lobby_code.clone();
            tasks.push(tokio::spawn(async move {
                join_lobby(
                    &state,
                    JoinLobbyRequest {
                        lobby_code,
                        display_name: format!("player-{n}"),
                    },
                )
                .await
            }));
        }

        let mut seats = Vec::new();
        for task in tasks {
            seats.push(task.await.unwrap().unwrap().player.turn_order);
        }
        seats.sort_unstable();
        assert_eq!(seats, vec![2, 3, 4, 5, 6, 7]);
    }
}
