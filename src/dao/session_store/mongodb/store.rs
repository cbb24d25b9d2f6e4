use std::{sync::Arc, time::SystemTime};

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Collection, Database,
    bson::{DateTime, doc},
    error::{Error as MongoError, ErrorKind, WriteFailure},
    options::IndexOptions,
};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{
        MongoGuessDocument, MongoPlayerDocument, MongoSessionDocument, MongoTurnDocument, doc_id,
        uuid_as_binary,
    },
};
use crate::dao::{
    models::{GuessEntity, PlayerEntity, SessionEntity, TurnEntity},
    session_store::SessionStore,
    storage::StorageResult,
};

const SESSION_COLLECTION: &str = "sessions";
const PLAYER_COLLECTION: &str = "players";
const TURN_COLLECTION: &str = "turns";
const GUESS_COLLECTION: &str = "guesses";

/// MongoDB-backed [`SessionStore`].
///
/// The completion gate and the per-(turn, player) guess uniqueness rely on a
/// conditional `update_one` and a unique index respectively, so no
/// multi-document transaction is needed.
#[derive(Clone)]
pub struct MongoSessionStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (_client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.database = database;
        Ok(())
    }
}

fn is_duplicate_key(err: &MongoError) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_err)) if write_err.code == 11_000
    )
}

impl MongoSessionStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (_client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let database = self.database().await;

        let unique_indexes: [(&'static str, &'static str, mongodb::bson::Document); 4] = [
            (SESSION_COLLECTION, "lobby_code", doc! {"lobby_code": 1}),
            (
                PLAYER_COLLECTION,
                "session_id,turn_order",
                doc! {"session_id": 1, "turn_order": 1},
            ),
            (
                TURN_COLLECTION,
                "session_id,round_number",
                doc! {"session_id": 1, "round_number": 1},
            ),
            (
                GUESS_COLLECTION,
                "turn_id,player_id",
                doc! {"turn_id": 1, "player_id": 1},
            ),
        ];

        for (collection_name, index_name, keys) in unique_indexes {
            let collection = database.collection::<mongodb::bson::Document>(collection_name);
            let index = mongodb::IndexModel::builder()
                .keys(keys)
                .options(
                    IndexOptions::builder()
                        .name(Some(format!("{collection_name}_{index_name}_uniq")))
                        .unique(Some(true))
                        .build(),
                )
                .build();

            collection
                .create_index(index)
                .await
                .map_err(|source| MongoDaoError::EnsureIndex {
                    collection: collection_name,
                    index: index_name,
                    source,
                })?;
        }

        Ok(())
    }

    async fn database(&self) -> Database {
        let guard = self.inner.state.read().await;
        guard.database.clone()
    }

    async fn sessions(&self) -> Collection<MongoSessionDocument> {
        self.database().await.collection(SESSION_COLLECTION)
    }

    async fn players(&self) -> Collection<MongoPlayerDocument> {
        self.database().await.collection(PLAYER_COLLECTION)
    }

    async fn turns(&self) -> Collection<MongoTurnDocument> {
        self.database().await.collection(TURN_COLLECTION)
    }

    async fn guesses(&self) -> Collection<MongoGuessDocument> {
        self.database().await.collection(GUESS_COLLECTION)
    }

    async fn upsert_session(&self, session: SessionEntity) -> MongoResult<()> {
        let id = session.id;
        let document: MongoSessionDocument = session.into();
        self.sessions()
            .await
            .replace_one(doc_id(id), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::Write {
                entity: "session",
                id,
                source,
            })?;
        Ok(())
    }
}

impl SessionStore for MongoSessionStore {
    fn insert_session(&self, session: SessionEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.upsert_session(session).await.map_err(Into::into) })
    }

    fn update_session(&self, session: SessionEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.upsert_session(session).await.map_err(Into::into) })
    }

    fn find_session(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<SessionEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let document = store
                .sessions()
                .await
                .find_one(doc_id(id))
                .await
                .map_err(|source| MongoDaoError::Read {
                    entity: "session",
                    source,
                })?;
            Ok(document.map(Into::into))
        })
    }

    fn find_session_by_code(
        &self,
        code: String,
    ) -> BoxFuture<'static, StorageResult<Option<SessionEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let document = store
                .sessions()
                .await
                .find_one(doc! {"lobby_code": code})
                .await
                .map_err(|source| MongoDaoError::Read {
                    entity: "session",
                    source,
                })?;
            Ok(document.map(Into::into))
        })
    }

    fn delete_session(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            let result = store
                .sessions()
                .await
                .delete_one(doc_id(id))
                .await
                .map_err(|source| MongoDaoError::Delete {
                    entity: "session",
                    source,
                })?;
            Ok(result.deleted_count > 0)
        })
    }

    fn insert_player(&self, player: PlayerEntity) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            let id = player.id;
            let document: MongoPlayerDocument = player.into();
            match store.players().await.insert_one(&document).await {
                Ok(_) => Ok(true),
                // The unique (session_id, turn_order) index turns a lost
                // seat race into a detectable no-op the caller can retry.
                Err(err) if is_duplicate_key(&err) => Ok(false),
                Err(source) => Err(MongoDaoError::Write {
                    entity: "player",
                    id,
                    source,
                }
                .into()),
            }
        })
    }

    fn find_player(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let document = store
                .players()
                .await
                .find_one(doc_id(id))
                .await
                .map_err(|source| MongoDaoError::Read {
                    entity: "player",
                    source,
                })?;
            Ok(document.map(Into::into))
        })
    }

    fn list_players(
        &self,
        session_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let documents: Vec<MongoPlayerDocument> = store
                .players()
                .await
                .find(doc! {"session_id": uuid_as_binary(session_id)})
                .sort(doc! {"turn_order": 1})
                .await
                .map_err(|source| MongoDaoError::Read {
                    entity: "player",
                    source,
                })?
                .try_collect()
                .await
                .map_err(|source| MongoDaoError::Read {
                    entity: "player",
                    source,
                })?;
            Ok(documents.into_iter().map(Into::into).collect())
        })
    }

    fn add_player_score(
        &self,
        player_id: Uuid,
        delta: u32,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .players()
                .await
                .update_one(doc_id(player_id), doc! {"$inc": {"score": delta as i64}})
                .await
                .map_err(|source| MongoDaoError::Write {
                    entity: "player",
                    id: player_id,
                    source,
                })?;
            Ok(())
        })
    }

    fn delete_players(&self, session_id: Uuid) -> BoxFuture<'static, StorageResult<u64>> {
        let store = self.clone();
        Box::pin(async move {
            let result = store
                .players()
                .await
                .delete_many(doc! {"session_id": uuid_as_binary(session_id)})
                .await
                .map_err(|source| MongoDaoError::Delete {
                    entity: "player",
                    source,
                })?;
            Ok(result.deleted_count)
        })
    }

    fn insert_turns(&self, turns: Vec<TurnEntity>) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            if turns.is_empty() {
                return Ok(());
            }
            let session_id = turns[0].session_id;
            let documents: Vec<MongoTurnDocument> = turns.into_iter().map(Into::into).collect();
            store
                .turns()
                .await
                .insert_many(&documents)
                .await
                .map_err(|source| MongoDaoError::Write {
                    entity: "turn",
                    id: session_id,
                    source,
                })?;
            Ok(())
        })
    }

    fn update_turn(&self, turn: TurnEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let id = turn.id;
            let document: MongoTurnDocument = turn.into();
            store
                .turns()
                .await
                .replace_one(doc_id(id), &document)
                .await
                .map_err(|source| MongoDaoError::Write {
                    entity: "turn",
                    id,
                    source,
                })?;
            Ok(())
        })
    }

    fn find_turn(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<TurnEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let document = store
                .turns()
                .await
                .find_one(doc_id(id))
                .await
                .map_err(|source| MongoDaoError::Read {
                    entity: "turn",
                    source,
                })?;
            Ok(document.map(Into::into))
        })
    }

    fn find_turn_by_round(
        &self,
        session_id: Uuid,
        round_number: u32,
    ) -> BoxFuture<'static, StorageResult<Option<TurnEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let filter = doc! {
                "session_id": uuid_as_binary(session_id),
                "round_number": round_number as i64,
            };
            let document = store.turns().await.find_one(filter).await.map_err(|source| {
                MongoDaoError::Read {
                    entity: "turn",
                    source,
                }
            })?;
            Ok(document.map(Into::into))
        })
    }

    fn list_turns(&self, session_id: Uuid) -> BoxFuture<'static, StorageResult<Vec<TurnEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let documents: Vec<MongoTurnDocument> = store
                .turns()
                .await
                .find(doc! {"session_id": uuid_as_binary(session_id)})
                .sort(doc! {"round_number": 1})
                .await
                .map_err(|source| MongoDaoError::Read {
                    entity: "turn",
                    source,
                })?
                .try_collect()
                .await
                .map_err(|source| MongoDaoError::Read {
                    entity: "turn",
                    source,
                })?;
            Ok(documents.into_iter().map(Into::into).collect())
        })
    }

    fn complete_turn(
        &self,
        turn_id: Uuid,
        at: SystemTime,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            // Single conditional write: only the caller that flips
            // completed_at from null wins the advancement gate.
            let filter = doc! {
                "_id": uuid_as_binary(turn_id),
                "completed_at": null,
            };
            let update = doc! {
                "$set": {"completed_at": DateTime::from_system_time(at)},
            };
            let result = store
                .turns()
                .await
                .update_one(filter, update)
                .await
                .map_err(|source| MongoDaoError::Write {
                    entity: "turn",
                    id: turn_id,
                    source,
                })?;
            Ok(result.modified_count > 0)
        })
    }

    fn delete_turns(&self, session_id: Uuid) -> BoxFuture<'static, StorageResult<u64>> {
        let store = self.clone();
        Box::pin(async move {
            let result = store
                .turns()
                .await
                .delete_many(doc! {"session_id": uuid_as_binary(session_id)})
                .await
                .map_err(|source| MongoDaoError::Delete {
                    entity: "turn",
                    source,
                })?;
            Ok(result.deleted_count)
        })
    }

    fn insert_guess(&self, guess: GuessEntity) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            let id = guess.id;
            let document: MongoGuessDocument = guess.into();
            match store.guesses().await.insert_one(&document).await {
                Ok(_) => Ok(true),
                // The unique (turn_id, player_id) index turns duplicate
                // submissions into a detectable no-op.
                Err(err) if is_duplicate_key(&err) => Ok(false),
                Err(source) => Err(MongoDaoError::Write {
                    entity: "guess",
                    id,
                    source,
                }
                .into()),
            }
        })
    }

    fn list_guesses(&self, turn_id: Uuid) -> BoxFuture<'static, StorageResult<Vec<GuessEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let documents: Vec<MongoGuessDocument> = store
                .guesses()
                .await
                .find(doc! {"turn_id": uuid_as_binary(turn_id)})
                .sort(doc! {"submitted_at": 1})
                .await
                .map_err(|source| MongoDaoError::Read {
                    entity: "guess",
                    source,
                })?
                .try_collect()
                .await
                .map_err(|source| MongoDaoError::Read {
                    entity: "guess",
                    source,
                })?;
            Ok(documents.into_iter().map(Into::into).collect())
        })
    }

    fn delete_guesses(&self, turn_ids: Vec<Uuid>) -> BoxFuture<'static, StorageResult<u64>> {
        let store = self.clone();
        Box::pin(async move {
            if turn_ids.is_empty() {
                return Ok(0);
            }
            let ids: Vec<_> = turn_ids.into_iter().map(uuid_as_binary).collect();
            let result = store
                .guesses()
                .await
                .delete_many(doc! {"turn_id": {"$in": ids}})
                .await
                .map_err(|source| MongoDaoError::Delete {
                    entity: "guess",
                    source,
                })?;
            Ok(result.deleted_count)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
