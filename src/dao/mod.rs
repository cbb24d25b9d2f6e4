/// Database model definitions shared across store backends.
pub mod models;
/// Session, player, turn, and guess storage operations.
pub mod session_store;
/// Storage abstraction layer for database operations.
pub mod storage;
