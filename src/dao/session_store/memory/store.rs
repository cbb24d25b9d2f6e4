use std::{sync::Arc, time::SystemTime};

use dashmap::{DashMap, Entry};
use futures::future::BoxFuture;
use uuid::Uuid;

use crate::dao::{
    models::{GuessEntity, PlayerEntity, SessionEntity, TurnEntity},
    session_store::SessionStore,
    storage::StorageResult,
};

/// Process-local store backend keeping every table in a [`DashMap`].
///
/// This is the default backend when no database is configured and the
/// substrate for the service test suite. The per-entry locking of `DashMap`
/// gives the same single-row atomicity the engine expects from a real
/// database: `insert_guess` and `complete_turn` are check-and-write under
/// one entry lock.
#[derive(Clone, Default)]
pub struct MemorySessionStore {
    inner: Arc<Tables>,
}

#[derive(Default)]
struct Tables {
    sessions: DashMap<Uuid, SessionEntity>,
    players: DashMap<Uuid, PlayerEntity>,
    turns: DashMap<Uuid, TurnEntity>,
    guesses: DashMap<Uuid, GuessEntity>,
    // Uniqueness indexes for (turn_id, player_id) and
    // (session_id, turn_order); the entry lock makes insert-if-absent atomic.
    guess_index: DashMap<(Uuid, Uuid), Uuid>,
    seat_index: DashMap<(Uuid, u32), Uuid>,
}

impl MemorySessionStore {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    fn insert_player_sync(&self, player: PlayerEntity) -> bool {
        match self
            .inner
            .seat_index
            .entry((player.session_id, player.turn_order))
        {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(player.id);
                self.inner.players.insert(player.id, player);
                true
            }
        }
    }

    fn insert_guess_sync(&self, guess: GuessEntity) -> bool {
        match self.inner.guess_index.entry((guess.turn_id, guess.player_id)) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(guess.id);
                self.inner.guesses.insert(guess.id, guess);
                true
            }
        }
    }

    fn complete_turn_sync(&self, turn_id: Uuid, at: SystemTime) -> bool {
        let Some(mut turn) = self.inner.turns.get_mut(&turn_id) else {
            return false;
        };
        if turn.completed_at.is_some() {
            return false;
        }
        turn.completed_at = Some(at);
        true
    }
}

impl SessionStore for MemorySessionStore {
    fn insert_session(&self, session: SessionEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.inner.sessions.insert(session.id, session);
            Ok(())
        })
    }

    fn update_session(&self, session: SessionEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.inner.sessions.insert(session.id, session);
            Ok(())
        })
    }

    fn find_session(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<SessionEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.inner.sessions.get(&id).map(|s| s.clone())) })
    }

    fn find_session_by_code(
        &self,
        code: String,
    ) -> BoxFuture<'static, StorageResult<Option<SessionEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            Ok(store
                .inner
                .sessions
                .iter()
                .find(|entry| entry.lobby_code == code)
                .map(|entry| entry.clone()))
        })
    }

    fn delete_session(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.inner.sessions.remove(&id).is_some()) })
    }

    fn insert_player(&self, player: PlayerEntity) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.insert_player_sync(player)) })
    }

    fn find_player(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.inner.players.get(&id).map(|p| p.clone())) })
    }

    fn list_players(
        &self,
        session_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let mut players: Vec<PlayerEntity> = store
                .inner
                .players
                .iter()
                .filter(|entry| entry.session_id == session_id)
                .map(|entry| entry.clone())
                .collect();
            players.sort_by_key(|p| p.turn_order);
            Ok(players)
        })
    }

    fn add_player_score(
        &self,
        player_id: Uuid,
        delta: u32,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            if let Some(mut player) = store.inner.players.get_mut(&player_id) {
                player.score += delta;
            }
            Ok(())
        })
    }

    fn delete_players(&self, session_id: Uuid) -> BoxFuture<'static, StorageResult<u64>> {
        let store = self.clone();
        Box::pin(async move {
            let seats: Vec<(Uuid, u32)> = store
                .inner
                .players
                .iter()
                .filter(|entry| entry.session_id == session_id)
                .map(|entry| (entry.id, entry.turn_order))
                .collect();
            let mut deleted = 0;
            for (id, turn_order) in seats {
                store.inner.seat_index.remove(&(session_id, turn_order));
                if store.inner.players.remove(&id).is_some() {
                    deleted += 1;
                }
            }
            Ok(deleted)
        })
    }

    fn insert_turns(&self, turns: Vec<TurnEntity>) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            for turn in turns {
                store.inner.turns.insert(turn.id, turn);
            }
            Ok(())
        })
    }

    fn update_turn(&self, turn: TurnEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.inner.turns.insert(turn.id, turn);
            Ok(())
        })
    }

    fn find_turn(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<TurnEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.inner.turns.get(&id).map(|t| t.clone())) })
    }

    fn find_turn_by_round(
        &self,
        session_id: Uuid,
        round_number: u32,
    ) -> BoxFuture<'static, StorageResult<Option<TurnEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            Ok(store
                .inner
                .turns
                .iter()
                .find(|entry| entry.session_id == session_id && entry.round_number == round_number)
                .map(|entry| entry.clone()))
        })
    }

    fn list_turns(&self, session_id: Uuid) -> BoxFuture<'static, StorageResult<Vec<TurnEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let mut turns: Vec<TurnEntity> = store
                .inner
                .turns
                .iter()
                .filter(|entry| entry.session_id == session_id)
                .map(|entry| entry.clone())
                .collect();
            turns.sort_by_key(|t| t.round_number);
            Ok(turns)
        })
    }

    fn complete_turn(
        &self,
        turn_id: Uuid,
        at: SystemTime,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.complete_turn_sync(turn_id, at)) })
    }

    fn delete_turns(&self, session_id: Uuid) -> BoxFuture<'static, StorageResult<u64>> {
        let store = self.clone();
        Box::pin(async move {
            let ids: Vec<Uuid> = store
                .inner
                .turns
                .iter()
                .filter(|entry| entry.session_id == session_id)
                .map(|entry| entry.id)
                .collect();
            let mut deleted = 0;
            for id in ids {
                if store.inner.turns.remove(&id).is_some() {
                    deleted += 1;
                }
            }
            Ok(deleted)
        })
    }

    fn insert_guess(&self, guess: GuessEntity) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.insert_guess_sync(guess)) })
    }

    fn list_guesses(&self, turn_id: Uuid) -> BoxFuture<'static, StorageResult<Vec<GuessEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let mut guesses: Vec<GuessEntity> = store
                .inner
                .guesses
                .iter()
                .filter(|entry| entry.turn_id == turn_id)
                .map(|entry| entry.clone())
                .collect();
            guesses.sort_by_key(|g| g.submitted_at);
            Ok(guesses)
        })
    }

    fn delete_guesses(&self, turn_ids: Vec<Uuid>) -> BoxFuture<'static, StorageResult<u64>> {
        let store = self.clone();
        Box::pin(async move {
            let ids: Vec<(Uuid, Uuid, Uuid)> = store
                .inner
                .guesses
                .iter()
                .filter(|entry| turn_ids.contains(&entry.turn_id))
                .map(|entry| (entry.id, entry.turn_id, entry.player_id))
                .collect();
            let mut deleted = 0;
            for (id, turn_id, player_id) in ids {
                store.inner.guess_index.remove(&(turn_id, player_id));
                if store.inner.guesses.remove(&id).is_some() {
                    deleted += 1;
                }
            }
            Ok(deleted)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::models::SessionStatus;

    fn sample_turn(session_id: Uuid) -> TurnEntity {
        TurnEntity {
            id: Uuid::new_v4(),
            session_id,
            round_number: 1,
            storyteller_id: Uuid::new_v4(),
            theme: None,
            element: None,
            hint: None,
            recording_id: None,
            completed_at: None,
        }
    }

    fn sample_player(session_id: Uuid, turn_order: u32) -> PlayerEntity {
        PlayerEntity {
            id: Uuid::new_v4(),
            session_id,
            display_name: format!("seat-{turn_order}"),
            score: 0,
            turn_order,
            is_host: turn_order == 1,
            joined_at: SystemTime::now(),
        }
    }

    fn sample_guess(turn_id: Uuid, player_id: Uuid) -> GuessEntity {
        GuessEntity {
            id: Uuid::new_v4(),
            turn_id,
            player_id,
            content: "a wild guess".into(),
            is_timeout: false,
            points_earned: 0,
            submitted_at: SystemTime::now(),
        }
    }

    #[tokio::test]
    async fn duplicate_guess_is_rejected() {
        let store = MemorySessionStore::new();
        let turn_id = Uuid::new_v4();
        let player_id = Uuid::new_v4();

        assert!(store.insert_guess(sample_guess(turn_id, player_id)).await.unwrap());
        assert!(!store.insert_guess(sample_guess(turn_id, player_id)).await.unwrap());

        let guesses = store.list_guesses(turn_id).await.unwrap();
        assert_eq!(guesses.len(), 1);
    }

    #[tokio::test]
    async fn same_player_may_guess_on_different_turns() {
        let store = MemorySessionStore::new();
        let player_id = Uuid::new_v4();
        let first_turn = Uuid::new_v4();
        let second_turn = Uuid::new_v4();

        assert!(store.insert_guess(sample_guess(first_turn, player_id)).await.unwrap());
        assert!(store.insert_guess(sample_guess(second_turn, player_id)).await.unwrap());
    }

    #[tokio::test]
    async fn complete_turn_wins_exactly_once() {
        let store = MemorySessionStore::new();
        let turn = sample_turn(Uuid::new_v4());
        let turn_id = turn.id;
        store.insert_turns(vec![turn]).await.unwrap();

        assert!(store.complete_turn(turn_id, SystemTime::now()).await.unwrap());
        assert!(!store.complete_turn(turn_id, SystemTime::now()).await.unwrap());

        let stored = store.find_turn(turn_id).await.unwrap().unwrap();
        assert!(stored.completed_at.is_some());
    }

    #[tokio::test]
    async fn complete_turn_on_missing_row_is_false() {
        let store = MemorySessionStore::new();
        assert!(!store.complete_turn(Uuid::new_v4(), SystemTime::now()).await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_seat_is_rejected() {
        let store = MemorySessionStore::new();
        let session_id = Uuid::new_v4();

        assert!(store.insert_player(sample_player(session_id, 2)).await.unwrap());
        assert!(!store.insert_player(sample_player(session_id, 2)).await.unwrap());

        let players = store.list_players(session_id).await.unwrap();
        assert_eq!(players.len(), 1);
        assert_eq!(players[0].turn_order, 2);
    }

    #[tokio::test]
    async fn same_seat_is_allowed_across_sessions() {
        let store = MemorySessionStore::new();
        assert!(store.insert_player(sample_player(Uuid::new_v4(), 1)).await.unwrap());
        assert!(store.insert_player(sample_player(Uuid::new_v4(), 1)).await.unwrap());
    }

    #[tokio::test]
    async fn delete_players_clears_seat_index() {
        let store = MemorySessionStore::new();
        let session_id = Uuid::new_v4();

        assert!(store.insert_player(sample_player(session_id, 1)).await.unwrap());
        assert_eq!(store.delete_players(session_id).await.unwrap(), 1);
        // The freed seat must be claimable again.
        assert!(store.insert_player(sample_player(session_id, 1)).await.unwrap());
    }

    #[tokio::test]
    async fn delete_guesses_clears_uniqueness_index() {
        let store = MemorySessionStore::new();
        let turn_id = Uuid::new_v4();
        let player_id = Uuid::new_v4();

        assert!(store.insert_guess(sample_guess(turn_id, player_id)).await.unwrap());
        assert_eq!(store.delete_guesses(vec![turn_id]).await.unwrap(), 1);
        // A fresh guess for the same pair must be accepted again.
        assert!(store.insert_guess(sample_guess(turn_id, player_id)).await.unwrap());
    }

    #[tokio::test]
    async fn lobby_code_lookup_finds_session() {
        let store = MemorySessionStore::new();
        let session = SessionEntity {
            id: Uuid::new_v4(),
            lobby_code: "ABC234".into(),
            status: SessionStatus::Waiting,
            current_round: 0,
            total_rounds: 0,
            current_storyteller_id: None,
            selected_audio_id: None,
            created_at: SystemTime::now(),
            started_at: None,
            ended_at: None,
        };
        store.insert_session(session.clone()).await.unwrap();

        let found = store.find_session_by_code("ABC234".into()).await.unwrap();
        assert_eq!(found, Some(session));
        assert!(store.find_session_by_code("ZZZZZZ".into()).await.unwrap().is_none());
    }
}
