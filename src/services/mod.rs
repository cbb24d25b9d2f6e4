/// Deferred removal of finished sessions.
pub mod cleanup;
/// OpenAPI documentation generation.
pub mod documentation;
/// Game bootstrap and session snapshots.
pub mod game_service;
/// Health check service.
pub mod health_service;
/// Client for the external hint generation service.
pub mod hint_service;
/// Lobby lifecycle: creation, joining, closing.
pub mod lobby_service;
/// Guess comparison and score rewards.
pub mod scoring;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
/// Storage connection supervision and degraded-mode handling.
pub mod storage_supervisor;
/// Turn progression engine: guesses, completion, advancement.
pub mod turn_service;
