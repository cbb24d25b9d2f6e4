use mongodb::error::Error as MongoError;
use thiserror::Error;
use uuid::Uuid;

/// Result alias for MongoDB DAO operations.
pub type MongoResult<T> = std::result::Result<T, MongoDaoError>;

/// Errors surfaced by the MongoDB session store.
#[derive(Debug, Error)]
pub enum MongoDaoError {
    /// The connection string could not be parsed.
    #[error("invalid MongoDB URI `{uri}`")]
    InvalidUri {
        uri: String,
        #[source]
        source: MongoError,
    },
    /// A required environment variable is missing.
    #[error("missing environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    /// The client could not be constructed from the parsed options.
    #[error("failed to construct MongoDB client")]
    ClientConstruction {
        #[source]
        source: MongoError,
    },
    /// The initial connection ping kept failing.
    #[error("could not reach MongoDB after {attempts} attempts")]
    InitialPing {
        attempts: u32,
        #[source]
        source: MongoError,
    },
    /// A health-check ping failed on an established connection.
    #[error("MongoDB health ping failed")]
    HealthPing {
        #[source]
        source: MongoError,
    },
    /// Creating one of the required indexes failed.
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        collection: &'static str,
        index: &'static str,
        #[source]
        source: MongoError,
    },
    /// A write against one of the collections failed.
    #[error("failed to write {entity} `{id}`")]
    Write {
        entity: &'static str,
        id: Uuid,
        #[source]
        source: MongoError,
    },
    /// A read against one of the collections failed.
    #[error("failed to read {entity} records")]
    Read {
        entity: &'static str,
        #[source]
        source: MongoError,
    },
    /// A bulk delete against one of the collections failed.
    #[error("failed to delete {entity} records")]
    Delete {
        entity: &'static str,
        #[source]
        source: MongoError,
    },
}
