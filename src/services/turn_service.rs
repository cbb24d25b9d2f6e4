//! Turn progression engine.
//!
//! Guesses, timeouts, turn completion and round advancement all funnel
//! through here. The engine holds no locks of its own: correctness under
//! concurrent submissions rests on two conditional store writes,
//! `insert_guess` (at most one guess per player per turn) and
//! `complete_turn` (exactly one caller wins the right to advance).

use std::collections::HashSet;
use std::time::SystemTime;

use tracing::info;
use uuid::Uuid;

use crate::{
    dao::models::{GuessEntity, PlayerEntity, SessionEntity, SessionStatus, TurnEntity},
    dto::{
        common::TurnSummary,
        game::{
            AttachRecordingRequest, GuessResponse, SubmitGuessRequest, TimeoutRequest,
            TurnPromptRequest,
        },
    },
    error::ServiceError,
    services::{cleanup, scoring, sse_events},
    state::SharedState,
};

/// Record a player's guess for a turn and advance the game if it was the
/// last one outstanding.
pub async fn submit_guess(
    state: &SharedState,
    turn_id: Uuid,
    request: SubmitGuessRequest,
) -> Result<GuessResponse, ServiceError> {
    let turn = require_turn(state, turn_id).await?;
    record_answer(state, turn, request.player_id, request.content, false).await
}

/// Auto-submission for a player whose guess timer elapsed. Resolved by
/// `(session, round)` so the client does not need the turn id, and safe to
/// call redundantly: a player who managed to guess in time is left alone.
pub async fn auto_submit_timeout(
    state: &SharedState,
    session_id: Uuid,
    request: TimeoutRequest,
) -> Result<GuessResponse, ServiceError> {
    let store = state.require_session_store().await?;
    let Some(turn) = store
        .find_turn_by_round(session_id, request.round_number)
        .await?
    else {
        return Err(ServiceError::NotFound(format!(
            "no turn for round {} of session `{session_id}`",
            request.round_number
        )));
    };

    info!(
        %session_id,
        round = request.round_number,
        player = %request.player_id,
        reason = request.reason.as_deref().unwrap_or("unspecified"),
        "guess timer elapsed; auto-submitting"
    );
    record_answer(
        state,
        turn,
        request.player_id,
        scoring::TIMEOUT_CONTENT.to_owned(),
        true,
    )
    .await
}

/// Storyteller picks theme and secret element for their turn; the hint shown
/// to guessers is generated out-of-band and never blocks on failure.
pub async fn set_turn_prompt(
    state: &SharedState,
    turn_id: Uuid,
    request: TurnPromptRequest,
) -> Result<TurnSummary, ServiceError> {
    let store = state.require_session_store().await?;
    let mut turn = require_turn(state, turn_id).await?;
    let session = require_session(state, turn.session_id).await?;

    if request.player_id != turn.storyteller_id {
        return Err(ServiceError::InvalidState(
            "only the storyteller may set the turn prompt".into(),
        ));
    }
    ensure_turn_playable(&turn, &session)?;

    let hint = state
        .hints()
        .generate(&request.theme, &request.element)
        .await;

    turn.theme = Some(request.theme.clone());
    turn.element = Some(request.element);
    turn.hint = Some(hint.clone());
    store.update_turn(turn.clone()).await?;

    sse_events::broadcast_turn_prompt_set(
        state,
        turn.session_id,
        turn.id,
        turn.round_number,
        request.theme,
        Some(hint),
    );
    Ok(turn.into())
}

/// Storyteller attaches the reference of their uploaded recording.
pub async fn attach_recording(
    state: &SharedState,
    turn_id: Uuid,
    request: AttachRecordingRequest,
) -> Result<TurnSummary, ServiceError> {
    let store = state.require_session_store().await?;
    let mut turn = require_turn(state, turn_id).await?;
    let session = require_session(state, turn.session_id).await?;

    if request.player_id != turn.storyteller_id {
        return Err(ServiceError::InvalidState(
            "only the storyteller may attach a recording".into(),
        ));
    }
    ensure_turn_playable(&turn, &session)?;

    turn.recording_id = Some(request.recording_id);
    store.update_turn(turn.clone()).await?;
    Ok(turn.into())
}

async fn record_answer(
    state: &SharedState,
    turn: TurnEntity,
    player_id: Uuid,
    content: String,
    is_timeout: bool,
) -> Result<GuessResponse, ServiceError> {
    let store = state.require_session_store().await?;
    let session = require_session(state, turn.session_id).await?;

    let Some(player) = store.find_player(player_id).await? else {
        return Err(ServiceError::NotFound(format!(
            "player `{player_id}` not found"
        )));
    };
    if player.session_id != session.id {
        return Err(ServiceError::NotFound(format!(
            "player `{player_id}` is not part of session `{}`",
            session.id
        )));
    }
    if player.id == turn.storyteller_id {
        return Err(ServiceError::InvalidState(
            "the storyteller cannot guess their own turn".into(),
        ));
    }

    // Absorb retries before any liveness checks so a client that re-sends
    // after the turn closed still gets a success.
    let guesses = store.list_guesses(turn.id).await?;
    if guesses.iter().any(|g| g.player_id == player.id) {
        return Ok(duplicate_response(&turn, &session));
    }

    ensure_turn_playable(&turn, &session)?;

    let points = if is_timeout {
        0
    } else {
        scoring::score_guess(turn.element.as_deref(), &content)
    };

    let inserted = store
        .insert_guess(GuessEntity {
            id: Uuid::new_v4(),
            turn_id: turn.id,
            player_id: player.id,
            content,
            is_timeout,
            points_earned: points,
            submitted_at: SystemTime::now(),
        })
        .await?;
    if !inserted {
        // Lost the insert race against a concurrent submission by the same
        // player; treat exactly like the early duplicate path.
        return Ok(duplicate_response(&turn, &session));
    }

    if points > 0 {
        store.add_player_score(player.id, points).await?;
    } else {
        store
            .add_player_score(turn.storyteller_id, scoring::STORYTELLER_MISS_REWARD)
            .await?;
    }

    let completed = check_turn_completion(state, &turn, &session).await?;
    Ok(GuessResponse {
        duplicate: false,
        points_earned: points,
        turn_completed: completed,
        game_completed: completed && turn.round_number >= session.total_rounds,
    })
}

/// Close the turn once every non-storyteller has answered. Returns whether
/// the turn is now complete (regardless of which caller closed it).
async fn check_turn_completion(
    state: &SharedState,
    turn: &TurnEntity,
    session: &SessionEntity,
) -> Result<bool, ServiceError> {
    let store = state.require_session_store().await?;

    let players = store.list_players(session.id).await?;
    let guessers: HashSet<Uuid> = store
        .list_guesses(turn.id)
        .await?
        .into_iter()
        .map(|g| g.player_id)
        .collect();
    let all_answered = players
        .iter()
        .filter(|p| p.id != turn.storyteller_id)
        .all(|p| guessers.contains(&p.id));
    if !all_answered {
        return Ok(false);
    }

    // Conditional write doubles as the advancement lock: of all callers that
    // observe a fully-answered turn, exactly one flips completed_at.
    if store.complete_turn(turn.id, SystemTime::now()).await? {
        sse_events::broadcast_turn_completed(state, session.id, turn.id, turn.round_number);
        advance_session(state, turn).await?;
    }
    Ok(true)
}

/// Move the session to the next round, or finish the game after the last
/// one. Only ever invoked by the winner of the completion gate.
async fn advance_session(state: &SharedState, finished: &TurnEntity) -> Result<(), ServiceError> {
    let store = state.require_session_store().await?;
    let mut session = require_session(state, finished.session_id).await?;

    if session.current_round < session.total_rounds {
        let next_round = session.current_round + 1;
        let Some(next_turn) = store.find_turn_by_round(session.id, next_round).await? else {
            return Err(ServiceError::InvalidState(format!(
                "round {next_round} of session `{}` has no pre-created turn",
                session.id
            )));
        };
        session.current_round = next_round;
        session.current_storyteller_id = Some(next_turn.storyteller_id);
        store.update_session(session.clone()).await?;

        info!(session_id = %session.id, round = next_round, "round advanced");
        sse_events::broadcast_round_advanced(state, session.id, next_round, next_turn.storyteller_id);
        return Ok(());
    }

    session.status = SessionStatus::Completed;
    session.ended_at = Some(SystemTime::now());
    store.update_session(session.clone()).await?;

    let players = store.list_players(session.id).await?;
    let Some(winner) = select_winner(&players) else {
        return Err(ServiceError::InvalidState(format!(
            "completed session `{}` has no players",
            session.id
        )));
    };
    info!(session_id = %session.id, winner = %winner.id, score = winner.score, "game completed");
    sse_events::broadcast_game_completed(
        state,
        session.id,
        winner.clone().into(),
        players.iter().cloned().map(Into::into).collect(),
    );
    cleanup::schedule_session_cleanup(state, session.id);
    Ok(())
}

/// Highest score wins; ties go to the earliest seat.
fn select_winner(players: &[PlayerEntity]) -> Option<&PlayerEntity> {
    players
        .iter()
        .max_by(|a, b| a.score.cmp(&b.score).then(b.turn_order.cmp(&a.turn_order)))
}

fn ensure_turn_playable(turn: &TurnEntity, session: &SessionEntity) -> Result<(), ServiceError> {
    if !turn.is_open() {
        return Err(ServiceError::InvalidState(
            "the turn has already been completed".into(),
        ));
    }
    if session.status != SessionStatus::Active {
        return Err(ServiceError::InvalidState(format!(
            "session is not active (status {:?})",
            session.status
        )));
    }
    if turn.round_number != session.current_round {
        return Err(ServiceError::InvalidState(format!(
            "turn belongs to round {}, but the session is on round {}",
            turn.round_number, session.current_round
        )));
    }
    Ok(())
}

fn duplicate_response(turn: &TurnEntity, session: &SessionEntity) -> GuessResponse {
    GuessResponse {
        duplicate: true,
        points_earned: 0,
        turn_completed: !turn.is_open(),
        game_completed: session.status.is_terminal(),
    }
}

async fn require_turn(state: &SharedState, turn_id: Uuid) -> Result<TurnEntity, ServiceError> {
    let store = state.require_session_store().await?;
    store
        .find_turn(turn_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("turn `{turn_id}` not found")))
}

async fn require_session(
    state: &SharedState,
    session_id: Uuid,
) -> Result<SessionEntity, ServiceError> {
    let store = state.require_session_store().await?;
    store
        .find_session(session_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("session `{session_id}` not found")))
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
        state::AppState,
    };

    async fn test_state() -> SharedState {
        let state = AppState::new(AppConfig::default());
        state
            .install_session_store(Arc::new(MemorySessionStore::default()))
            .await;
        state
    }

    /// Lobby of `player_count` players with the game already started.
    /// Returns `(session_id, players ordered by seat, round-1 turn)`.
    async fn started_game(
        state: &SharedState,
        player_count: usize,
    ) -> (Uuid, Vec<PlayerEntity>, TurnEntity) {
        let lobby = lobby_service::create_lobby(
            state,
            CreateLobbyRequest {
                display_name: "host".into(),
            },
        )
        .await
        .unwrap();
        for n in 2..=player_count {
            lobby_service::join_lobby(
                state,
                JoinLobbyRequest {
                    lobby_code: lobby.session.lobby_code.clone(),
                    display_name: format!("player-{n}"),
                },
            )
            .await
            .unwrap();
        }

        let session_id = lobby.session.id;
        game_service::start_game(state, session_id, StartGameRequest::default())
            .await
            .unwrap();

        let store = state.session_store().await.unwrap();
        let players = store.list_players(session_id).await.unwrap();
        let turn = store
            .find_turn_by_round(session_id, 1)
            .await
            .unwrap()
            .unwrap();
        (session_id, players, turn)
    }

    async fn set_prompt(state: &SharedState, turn: &TurnEntity, element: &str) -> TurnEntity {
        set_turn_prompt(
            state,
            turn.id,
            TurnPromptRequest {
                player_id: turn.storyteller_id,
                theme: "campfire tales".into(),
                element: element.into(),
            },
        )
        .await
        .unwrap();
        let store = state.session_store().await.unwrap();
        store.find_turn(turn.id).await.unwrap().unwrap()
    }

    async fn score_of(state: &SharedState, player_id: Uuid) -> u32 {
        let store = state.session_store().await.unwrap();
        store.find_player(player_id).await.unwrap().unwrap().score
    }

    fn guess(player_id: Uuid, content: &str) -> SubmitGuessRequest {
        SubmitGuessRequest {
            player_id,
            content: content.into(),
        }
    }

    #[tokio::test]
    async fn correct_guess_pays_the_guesser() {
        let state = test_state().await;
        let (_, players, turn) = started_game(&state, 3).await;
        let turn = set_prompt(&state, &turn, "haunted mill").await;

        let response = submit_guess(&state, turn.id, guess(players[1].id, "Haunted Mill!"))
            .await
            .unwrap();
        assert!(!response.duplicate);
        assert_eq!(response.points_earned, scoring::CORRECT_GUESS_POINTS);
        assert_eq!(score_of(&state, players[1].id).await, 2);
        assert_eq!(score_of(&state, players[0].id).await, 0);
    }

    #[tokio::test]
    async fn missed_guess_pays_the_storyteller() {
        let state = test_state().await;
        let (_, players, turn) = started_game(&state, 3).await;
        let turn = set_prompt(&state, &turn, "haunted mill").await;

        let response = submit_guess(&state, turn.id, guess(players[1].id, "windmill"))
            .await
            .unwrap();
        assert_eq!(response.points_earned, 0);
        assert_eq!(score_of(&state, players[1].id).await, 0);
        assert_eq!(score_of(&state, players[0].id).await, 1);
    }

    #[tokio::test]
    async fn second_guess_by_same_player_is_a_no_op() {
        let state = test_state().await;
        let (_, players, turn) = started_game(&state, 3).await;
        let turn = set_prompt(&state, &turn, "haunted mill").await;

        submit_guess(&state, turn.id, guess(players[1].id, "windmill"))
            .await
            .unwrap();
        let retry = submit_guess(&state, turn.id, guess(players[1].id, "haunted mill"))
            .await
            .unwrap();
        assert!(retry.duplicate);
        assert_eq!(retry.points_earned, 0);
        // No second reward for the storyteller either.
        assert_eq!(score_of(&state, players[0].id).await, 1);
    }

    #[tokio::test]
    async fn storyteller_cannot_guess_their_own_turn() {
        let state = test_state().await;
        let (_, players, turn) = started_game(&state, 3).await;
        let turn = set_prompt(&state, &turn, "haunted mill").await;

        let err = submit_guess(&state, turn.id, guess(players[0].id, "haunted mill"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[tokio::test]
    async fn outsider_cannot_guess() {
        let state = test_state().await;
        let (_, _, turn) = started_game(&state, 2).await;
        let err = submit_guess(&state, turn.id, guess(Uuid::new_v4(), "anything"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn last_guess_closes_the_turn_and_advances_the_round() {
        let state = test_state().await;
        let (session_id, players, turn) = started_game(&state, 3).await;
        let turn = set_prompt(&state, &turn, "haunted mill").await;

        let first = submit_guess(&state, turn.id, guess(players[1].id, "windmill"))
            .await
            .unwrap();
        assert!(!first.turn_completed);

        let second = submit_guess(&state, turn.id, guess(players[2].id, "haunted mill"))
            .await
            .unwrap();
        assert!(second.turn_completed);
        assert!(!second.game_completed);

        let store = state.session_store().await.unwrap();
        let session = store.find_session(session_id).await.unwrap().unwrap();
        assert_eq!(session.current_round, 2);
        assert_eq!(session.current_storyteller_id, Some(players[1].id));
        assert!(!store.find_turn(turn.id).await.unwrap().unwrap().is_open());
    }

    #[tokio::test]
    async fn completion_is_order_independent() {
        for reversed in [false, true] {
            let state = test_state().await;
            let (session_id, players, turn) = started_game(&state, 3).await;
            let turn = set_prompt(&state, &turn, "haunted mill").await;

            let mut guessers = vec![players[1].id, players[2].id];
            if reversed {
                guessers.reverse();
            }
            for player_id in guessers {
                submit_guess(&state, turn.id, guess(player_id, "windmill"))
                    .await
                    .unwrap();
            }

            let store = state.session_store().await.unwrap();
            let session = store.find_session(session_id).await.unwrap().unwrap();
            assert_eq!(session.current_round, 2);
            assert_eq!(score_of(&state, players[0].id).await, 2);
        }
    }

    #[tokio::test]
    async fn concurrent_final_guesses_advance_exactly_once() {
        let state = test_state().await;
        let (session_id, players, turn) = started_game(&state, 4).await;
        let turn = set_prompt(&state, &turn, "haunted mill").await;

        submit_guess(&state, turn.id, guess(players[1].id, "windmill"))
            .await
            .unwrap();

        // Both remaining guessers race; whichever lands last closes the turn
        // and exactly one caller may win the advancement gate.
        let (a, b) = tokio::join!(
            submit_guess(&state, turn.id, guess(players[2].id, "old mill")),
            submit_guess(&state, turn.id, guess(players[3].id, "mill house")),
        );
        assert!(a.unwrap().turn_completed || b.unwrap().turn_completed);

        let store = state.session_store().await.unwrap();
        let session = store.find_session(session_id).await.unwrap().unwrap();
        assert_eq!(session.current_round, 2);
        assert_eq!(session.current_storyteller_id, Some(players[1].id));
    }

    #[tokio::test]
    async fn concurrent_duplicate_guesses_score_once() {
        let state = test_state().await;
        let (_, players, turn) = started_game(&state, 3).await;
        let turn = set_prompt(&state, &turn, "haunted mill").await;

        let (a, b) = tokio::join!(
            submit_guess(&state, turn.id, guess(players[1].id, "haunted mill")),
            submit_guess(&state, turn.id, guess(players[1].id, "haunted mill")),
        );
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_eq!(u32::from(a.duplicate) + u32::from(b.duplicate), 1);
        assert_eq!(score_of(&state, players[1].id).await, 2);
    }

    #[tokio::test]
    async fn rounds_map_to_seats() {
        let state = test_state().await;
        let (session_id, players, _) = started_game(&state, 4).await;

        let store = state.session_store().await.unwrap();
        for (seat, player) in players.iter().enumerate() {
            let round = seat as u32 + 1;
            let turn = store
                .find_turn_by_round(session_id, round)
                .await
                .unwrap()
                .unwrap();
            assert_eq!(turn.storyteller_id, player.id);
            assert_eq!(player.turn_order, round);
        }
    }

    #[tokio::test]
    async fn guess_on_a_future_round_is_rejected() {
        let state = test_state().await;
        let (session_id, players, _) = started_game(&state, 3).await;

        let store = state.session_store().await.unwrap();
        let round_two = store
            .find_turn_by_round(session_id, 2)
            .await
            .unwrap()
            .unwrap();
        let err = submit_guess(&state, round_two.id, guess(players[2].id, "early"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[tokio::test]
    async fn timeout_records_sentinel_and_pays_storyteller() {
        let state = test_state().await;
        let (session_id, players, turn) = started_game(&state, 3).await;
        set_prompt(&state, &turn, "haunted mill").await;

        let response = auto_submit_timeout(
            &state,
            session_id,
            TimeoutRequest {
                round_number: 1,
                player_id: players[1].id,
                reason: Some("timer elapsed".into()),
            },
        )
        .await
        .unwrap();
        assert!(!response.duplicate);
        assert_eq!(response.points_earned, 0);
        assert_eq!(score_of(&state, players[0].id).await, 1);

        let store = state.session_store().await.unwrap();
        let guesses = store.list_guesses(turn.id).await.unwrap();
        assert_eq!(guesses.len(), 1);
        assert!(guesses[0].is_timeout);
        assert_eq!(guesses[0].content, scoring::TIMEOUT_CONTENT);
    }

    #[tokio::test]
    async fn timeout_after_a_real_guess_is_a_no_op() {
        let state = test_state().await;
        let (session_id, players, turn) = started_game(&state, 3).await;
        let turn = set_prompt(&state, &turn, "haunted mill").await;

        submit_guess(&state, turn.id, guess(players[1].id, "haunted mill"))
            .await
            .unwrap();
        let response = auto_submit_timeout(
            &state,
            session_id,
            TimeoutRequest {
                round_number: 1,
                player_id: players[1].id,
                reason: None,
            },
        )
        .await
        .unwrap();
        assert!(response.duplicate);
        assert_eq!(score_of(&state, players[1].id).await, 2);
    }

    #[tokio::test]
    async fn full_game_reaches_completed_with_a_winner() {
        let state = test_state().await;
        let (session_id, players, _) = started_game(&state, 3).await;
        let store = state.session_store().await.unwrap();

        for round in 1..=3u32 {
            let turn = store
                .find_turn_by_round(session_id, round)
                .await
                .unwrap()
                .unwrap();
            let turn = set_prompt(&state, &turn, "secret phrase").await;
            for player in &players {
                if player.id == turn.storyteller_id {
                    continue;
                }
                // Seat 2 always finds the phrase, everyone else misses.
                let content = if player.turn_order == 2 {
                    "secret phrase"
                } else {
                    "no idea"
                };
                submit_guess(&state, turn.id, guess(player.id, content))
                    .await
                    .unwrap();
            }
        }

        let session = store.find_session(session_id).await.unwrap().unwrap();
        assert_eq!(session.status, SessionStatus::Completed);
        assert!(session.ended_at.is_some());
        assert_eq!(session.current_round, 3);

        // Seat 2: two matches (rounds 1 and 3) plus two miss rewards while
        // storytelling round 2. Seats 1 and 3 each earned one miss reward.
        assert_eq!(score_of(&state, players[1].id).await, 6);
        assert_eq!(score_of(&state, players[0].id).await, 1);
        assert_eq!(score_of(&state, players[2].id).await, 1);

        let final_players = store.list_players(session_id).await.unwrap();
        assert_eq!(select_winner(&final_players).unwrap().id, players[1].id);
    }

    #[tokio::test]
    async fn guess_after_game_completion_is_still_absorbed() {
        let state = test_state().await;
        let (session_id, players, first_turn) = started_game(&state, 2).await;
        let store = state.session_store().await.unwrap();

        let first_turn = set_prompt(&state, &first_turn, "secret phrase").await;
        let opening = submit_guess(&state, first_turn.id, guess(players[1].id, "secret phrase"))
            .await
            .unwrap();
        assert!(opening.turn_completed);
        assert!(!opening.game_completed);

        let last_turn = store
            .find_turn_by_round(session_id, 2)
            .await
            .unwrap()
            .unwrap();
        let last_turn = set_prompt(&state, &last_turn, "other phrase").await;
        let winning = submit_guess(&state, last_turn.id, guess(players[0].id, "other phrase"))
            .await
            .unwrap();
        assert!(winning.game_completed);

        let retry = submit_guess(&state, last_turn.id, guess(players[0].id, "other phrase"))
            .await
            .unwrap();
        assert!(retry.duplicate);
        assert!(retry.turn_completed);
        assert!(retry.game_completed);
    }

    #[tokio::test]
    async fn prompt_is_rejected_for_non_storytellers() {
        let state = test_state().await;
        let (_, players, turn) = started_game(&state, 2).await;

        let err = set_turn_prompt(
            &state,
            turn.id,
            TurnPromptRequest {
                player_id: players[1].id,
                theme: "campfire tales".into(),
                element: "haunted mill".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[tokio::test]
    async fn prompt_gets_a_fallback_hint_when_unconfigured() {
        let state = test_state().await;
        let (_, _, turn) = started_game(&state, 2).await;
        let turn = set_prompt(&state, &turn, "haunted mill").await;

        assert_eq!(turn.hint.as_deref(), Some("Something to do with campfire tales..."));
        assert_eq!(turn.element.as_deref(), Some("haunted mill"));
    }

    #[tokio::test]
    async fn recording_attaches_to_the_storytellers_turn() {
        let state = test_state().await;
        let (_, players, turn) = started_game(&state, 2).await;

        let summary = attach_recording(
            &state,
            turn.id,
            AttachRecordingRequest {
                player_id: players[0].id,
                recording_id: "rec/abc123".into(),
            },
        )
        .await
        .unwrap();
        assert!(summary.has_recording);

        let err = attach_recording(
            &state,
            turn.id,
            AttachRecordingRequest {
                player_id: players[1].id,
                recording_id: "rec/evil".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[test]
    fn winner_tie_breaks_on_earliest_seat() {
        let base = PlayerEntity {
            id: Uuid::new_v4(),
            session_id: Uuid::new_v4(),
            display_name: "p".into(),
            score: 3,
            turn_order: 1,
            is_host: false,
            joined_at: SystemTime::now(),
        };
        let players = vec![
            PlayerEntity {
                id: Uuid::new_v4(),
                turn_order: 2,
                ..base.clone()
            },
            PlayerEntity {
                turn_order: 3,
                ..base.clone()
            },
            PlayerEntity {
                id: Uuid::new_v4(),
                score: 1,
                turn_order: 1,
                ..base.clone()
            },
        ];
        let winner = select_winner(&players).unwrap();
        assert_eq!(winner.turn_order, 2);
    }
}
