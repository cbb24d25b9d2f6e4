use mongodb::options::ClientOptions;

use super::error::{MongoDaoError, MongoResult};

/// Connection parameters for the MongoDB session store.
#[derive(Clone)]
pub struct MongoConfig {
    /// Parsed client options derived from the connection URI.
    pub options: ClientOptions,
    /// Database that holds the session collections.
    pub database_name: String,
}

impl MongoConfig {
    /// Parse a connection URI, defaulting the database name when omitted.
    pub async fn from_uri(uri: &str, db_name: Option<&str>) -> MongoResult<Self> {
        let database_name = db_name.unwrap_or("phraseotomy").to_owned();
        let options =
            ClientOptions::parse(uri)
                .await
                .map_err(|source| MongoDaoError::InvalidUri {
                    uri: uri.to_owned(),
                    source,
                })?;

        Ok(Self {
            options,
            database_name,
        })
    }

    /// Build the configuration from `MONGO_URI` and (optionally) `MONGO_DB`.
    pub async fn from_env() -> MongoResult<Self> {
        let uri = std::env::var("MONGO_URI")
            .map_err(|_| MongoDaoError::MissingEnvVar { var: "MONGO_URI" })?;
        let db = std::env::var("MONGO_DB").ok();
        Self::from_uri(&uri, db.as_deref()).await
    }
}
