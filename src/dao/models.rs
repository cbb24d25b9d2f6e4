use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use utoipa::ToSchema;
use uuid::Uuid;

/// Lifecycle of a game session. Transitions are monotonic: a session moves
/// `Waiting -> Active -> Completed` and never backwards.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Lobby is open; players may still join.
    Waiting,
    /// Game is in progress; rounds are being played.
    Active,
    /// Game has ended; the session is waiting for deferred cleanup.
    Completed,
}

impl SessionStatus {
    /// Whether the status is allowed to move to `next`.
    pub fn may_become(self, next: SessionStatus) -> bool {
        matches!(
            (self, next),
            (SessionStatus::Waiting, SessionStatus::Active)
                | (SessionStatus::Active, SessionStatus::Completed)
        )
    }

    /// Whether this is a terminal status.
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Completed)
    }
}

/// Aggregate session entity persisted by the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionEntity {
    /// Primary key of the session.
    pub id: Uuid,
    /// Six-character human-enterable lobby token.
    pub lobby_code: String,
    /// Current lifecycle status.
    pub status: SessionStatus,
    /// Round currently being played (1-based; meaningful once active).
    pub current_round: u32,
    /// Number of rounds in the game, fixed at start to the player count.
    pub total_rounds: u32,
    /// Player whose turn it currently is, once the game has started.
    pub current_storyteller_id: Option<Uuid>,
    /// Optional audio pack selected by the host at game start.
    pub selected_audio_id: Option<String>,
    /// Creation timestamp for auditing/debugging.
    pub created_at: SystemTime,
    /// Set when the game starts.
    pub started_at: Option<SystemTime>,
    /// Set when the game completes.
    pub ended_at: Option<SystemTime>,
}

/// Participant of a session. Guests are first-class: the id is stable for the
/// lifetime of the session but is not tied to a registered account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerEntity {
    /// Primary key of the player.
    pub id: Uuid,
    /// Session this player belongs to.
    pub session_id: Uuid,
    /// Display name chosen in the lobby.
    pub display_name: String,
    /// Current score; only ever incremented during a game.
    pub score: u32,
    /// Seat number, dense 1..N and unique within the session. Round k is
    /// told by the player whose turn_order is k.
    pub turn_order: u32,
    /// Whether this player created the lobby.
    pub is_host: bool,
    /// When the player joined the lobby.
    pub joined_at: SystemTime,
}

/// One round of play, bound to exactly one storyteller. Exactly one turn
/// exists per (session, round_number); all rows are pre-created at game start.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TurnEntity {
    /// Primary key of the turn.
    pub id: Uuid,
    /// Session this turn belongs to.
    pub session_id: Uuid,
    /// Round this turn covers (1..total_rounds).
    pub round_number: u32,
    /// Player presenting this round.
    pub storyteller_id: Uuid,
    /// Theme chosen by the storyteller.
    pub theme: Option<String>,
    /// Secret phrase the other players must guess.
    pub element: Option<String>,
    /// Generated hint ("whisp") shown to guessers.
    pub hint: Option<String>,
    /// Opaque reference to the storyteller's audio recording.
    pub recording_id: Option<String>,
    /// Set exactly once when the last guess lands; the turn is open while
    /// this is `None`. Never cleared.
    pub completed_at: Option<SystemTime>,
}

impl TurnEntity {
    /// Whether the turn is still accepting guesses.
    pub fn is_open(&self) -> bool {
        self.completed_at.is_none()
    }
}

/// A single player's answer for a turn. At most one guess exists per
/// (turn, player); the store rejects duplicates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GuessEntity {
    /// Primary key of the guess.
    pub id: Uuid,
    /// Turn this guess answers.
    pub turn_id: Uuid,
    /// Player who submitted (never the storyteller).
    pub player_id: Uuid,
    /// Submitted text, or the timeout sentinel.
    pub content: String,
    /// Whether this row was auto-submitted by a timeout.
    pub is_timeout: bool,
    /// Points the guesser earned for this guess.
    pub points_earned: u32,
    /// When the guess was recorded.
    pub submitted_at: SystemTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_moves_forward_only() {
        assert!(SessionStatus::Waiting.may_become(SessionStatus::Active));
        assert!(SessionStatus::Active.may_become(SessionStatus::Completed));
    }

    #[test]
    fn status_never_reverses_or_skips_backwards() {
        assert!(!SessionStatus::Active.may_become(SessionStatus::Waiting));
        assert!(!SessionStatus::Completed.may_become(SessionStatus::Active));
        assert!(!SessionStatus::Completed.may_become(SessionStatus::Waiting));
        assert!(!SessionStatus::Waiting.may_become(SessionStatus::Completed));
    }

    #[test]
    fn status_does_not_self_loop() {
        assert!(!SessionStatus::Waiting.may_become(SessionStatus::Waiting));
        assert!(!SessionStatus::Active.may_become(SessionStatus::Active));
        assert!(!SessionStatus::Completed.may_become(SessionStatus::Completed));
    }

    #[test]
    fn completed_is_terminal() {
        assert!(SessionStatus::Completed.is_terminal());
        assert!(!SessionStatus::Waiting.is_terminal());
        assert!(!SessionStatus::Active.is_terminal());
    }
}
