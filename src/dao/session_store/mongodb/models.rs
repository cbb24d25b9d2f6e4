use mongodb::bson::{Binary, DateTime, Document, doc, spec::BinarySubtype};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dao::models::{GuessEntity, PlayerEntity, SessionEntity, SessionStatus, TurnEntity};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoSessionDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    lobby_code: String,
    status: SessionStatus,
    current_round: u32,
    total_rounds: u32,
    current_storyteller_id: Option<Uuid>,
    selected_audio_id: Option<String>,
    created_at: DateTime,
    started_at: Option<DateTime>,
    ended_at: Option<DateTime>,
}

impl From<SessionEntity> for MongoSessionDocument {
    fn from(value: SessionEntity) -> Self {
        Self {
            id: value.id,
            lobby_code: value.lobby_code,
            status: value.status,
            current_round: value.current_round,
            total_rounds: value.total_rounds,
            current_storyteller_id: value.current_storyteller_id,
            selected_audio_id: value.selected_audio_id,
            created_at: DateTime::from_system_time(value.created_at),
            started_at: value.started_at.map(DateTime::from_system_time),
            ended_at: value.ended_at.map(DateTime::from_system_time),
        }
    }
}

impl From<MongoSessionDocument> for SessionEntity {
    fn from(value: MongoSessionDocument) -> Self {
        Self {
            id: value.id,
            lobby_code: value.lobby_code,
            status: value.status,
            current_round: value.current_round,
            total_rounds: value.total_rounds,
            current_storyteller_id: value.current_storyteller_id,
            selected_audio_id: value.selected_audio_id,
            created_at: value.created_at.to_system_time(),
            started_at: value.started_at.map(|at| at.to_system_time()),
            ended_at: value.ended_at.map(|at| at.to_system_time()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoPlayerDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    session_id: Uuid,
    display_name: String,
    score: u32,
    turn_order: u32,
    is_host: bool,
    joined_at: DateTime,
}

impl From<PlayerEntity> for MongoPlayerDocument {
    fn from(value: PlayerEntity) -> Self {
        Self {
            id: value.id,
            session_id: value.session_id,
            display_name: value.display_name,
            score: value.score,
            turn_order: value.turn_order,
            is_host: value.is_host,
            joined_at: DateTime::from_system_time(value.joined_at),
        }
    }
}

impl From<MongoPlayerDocument> for PlayerEntity {
    fn from(value: MongoPlayerDocument) -> Self {
        Self {
            id: value.id,
            session_id: value.session_id,
            display_name: value.display_name,
            score: value.score,
            turn_order: value.turn_order,
            is_host: value.is_host,
            joined_at: value.joined_at.to_system_time(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoTurnDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    session_id: Uuid,
    round_number: u32,
    storyteller_id: Uuid,
    theme: Option<String>,
    element: Option<String>,
    hint: Option<String>,
    recording_id: Option<String>,
    completed_at: Option<DateTime>,
}

impl From<TurnEntity> for MongoTurnDocument {
    fn from(value: TurnEntity) -> Self {
        Self {
            id: value.id,
            session_id: value.session_id,
            round_number: value.round_number,
            storyteller_id: value.storyteller_id,
            theme: value.theme,
            element: value.element,
            hint: value.hint,
            recording_id: value.recording_id,
            completed_at: value.completed_at.map(DateTime::from_system_time),
        }
    }
}

impl From<MongoTurnDocument> for TurnEntity {
    fn from(value: MongoTurnDocument) -> Self {
        Self {
            id: value.id,
            session_id: value.session_id,
            round_number: value.round_number,
            storyteller_id: value.storyteller_id,
            theme: value.theme,
            element: value.element,
            hint: value.hint,
            recording_id: value.recording_id,
            completed_at: value.completed_at.map(|at| at.to_system_time()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoGuessDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    turn_id: Uuid,
    player_id: Uuid,
    content: String,
    is_timeout: bool,
    points_earned: u32,
    submitted_at: DateTime,
}

impl From<GuessEntity> for MongoGuessDocument {
    fn from(value: GuessEntity) -> Self {
        Self {
            id: value.id,
            turn_id: value.turn_id,
            player_id: value.player_id,
            content: value.content,
            is_timeout: value.is_timeout,
            points_earned: value.points_earned,
            submitted_at: DateTime::from_system_time(value.submitted_at),
        }
    }
}

impl From<MongoGuessDocument> for GuessEntity {
    fn from(value: MongoGuessDocument) -> Self {
        Self {
            id: value.id,
            turn_id: value.turn_id,
            player_id: value.player_id,
            content: value.content,
            is_timeout: value.is_timeout,
            points_earned: value.points_earned,
            submitted_at: value.submitted_at.to_system_time(),
        }
    }
}

pub fn uuid_as_binary(id: Uuid) -> Binary {
    Binary {
        subtype: BinarySubtype::Uuid,
        bytes: id.into_bytes().to_vec(),
    }
}

pub fn doc_id(id: Uuid) -> Document {
    doc! {"_id": uuid_as_binary(id)}
}
