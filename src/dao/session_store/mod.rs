pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use std::time::SystemTime;

use futures::future::BoxFuture;
use uuid::Uuid;

use crate::dao::models::{GuessEntity, PlayerEntity, SessionEntity, TurnEntity};
use crate::dao::storage::StorageResult;

/// Abstraction over the persistence layer for sessions and their child rows.
///
/// The store offers no cross-table transactions. The boolean-returning
/// operations are single-row conditional writes and are the only
/// synchronization primitives the engine relies on: `insert_guess` is an
/// insert-if-absent on `(turn_id, player_id)`, `insert_player` is an
/// insert-if-absent on `(session_id, turn_order)`, and `complete_turn` sets
/// `completed_at` only while it is still unset. Whichever caller observes
/// `true` from `complete_turn` owns round advancement.
pub trait SessionStore: Send + Sync {
    /// Persist a brand-new session row.
    fn insert_session(&self, session: SessionEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Replace an existing session row with the provided state.
    fn update_session(&self, session: SessionEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Look up a session by primary key.
    fn find_session(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<SessionEntity>>>;
    /// Look up a session by its lobby code.
    fn find_session_by_code(
        &self,
        code: String,
    ) -> BoxFuture<'static, StorageResult<Option<SessionEntity>>>;
    /// Delete a session row, returning whether it existed.
    fn delete_session(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;

    /// Insert a player unless their `(session_id, turn_order)` seat is
    /// already taken. Returns `false` when the seat was lost to a
    /// concurrent join and nothing was written.
    fn insert_player(&self, player: PlayerEntity) -> BoxFuture<'static, StorageResult<bool>>;
    /// Look up a player by primary key.
    fn find_player(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>>;
    /// All players of a session, ordered by turn_order.
    fn list_players(
        &self,
        session_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>>;
    /// Atomically add `delta` points to a player's score.
    fn add_player_score(
        &self,
        player_id: Uuid,
        delta: u32,
    ) -> BoxFuture<'static, StorageResult<()>>;
    /// Remove every player of a session, returning the number deleted.
    fn delete_players(&self, session_id: Uuid) -> BoxFuture<'static, StorageResult<u64>>;

    /// Persist a batch of turn rows (used to pre-create all rounds at start).
    fn insert_turns(&self, turns: Vec<TurnEntity>) -> BoxFuture<'static, StorageResult<()>>;
    /// Replace an existing turn row (prompt and recording updates).
    fn update_turn(&self, turn: TurnEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Look up a turn by primary key.
    fn find_turn(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<TurnEntity>>>;
    /// Look up a session's turn for a specific round.
    fn find_turn_by_round(
        &self,
        session_id: Uuid,
        round_number: u32,
    ) -> BoxFuture<'static, StorageResult<Option<TurnEntity>>>;
    /// All turns of a session, ordered by round_number.
    fn list_turns(&self, session_id: Uuid) -> BoxFuture<'static, StorageResult<Vec<TurnEntity>>>;
    /// Conditionally mark a turn completed. Returns `true` when this call
    /// set `completed_at`, `false` when the turn was already completed or
    /// does not exist.
    fn complete_turn(
        &self,
        turn_id: Uuid,
        at: SystemTime,
    ) -> BoxFuture<'static, StorageResult<bool>>;
    /// Remove every turn of a session, returning the number deleted.
    fn delete_turns(&self, session_id: Uuid) -> BoxFuture<'static, StorageResult<u64>>;

    /// Insert a guess unless one already exists for its (turn, player) pair.
    /// Returns `false` when a duplicate was detected and nothing was written.
    fn insert_guess(&self, guess: GuessEntity) -> BoxFuture<'static, StorageResult<bool>>;
    /// All guesses recorded for a turn.
    fn list_guesses(&self, turn_id: Uuid) -> BoxFuture<'static, StorageResult<Vec<GuessEntity>>>;
    /// Remove every guess belonging to the given turns, returning the number
    /// deleted.
    fn delete_guesses(&self, turn_ids: Vec<Uuid>) -> BoxFuture<'static, StorageResult<u64>>;

    /// Probe backend connectivity.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Attempt to re-establish the backend connection in place.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
