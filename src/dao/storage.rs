use std::error::Error;
use thiserror::Error;

/// Result alias for session-store operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Backend-agnostic failure raised by a session store.
///
/// Every backend folds its own error type into `Unavailable`; callers treat
/// it as retryable and surface it as a 503. All engine mutations are
/// idempotent or conditionally gated, so a retry after one of these is safe.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("session store unavailable: {message}")]
    Unavailable {
        message: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

impl StorageError {
    /// Wrap a backend failure, keeping it as the error source.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }
}
