use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the Phraseotomy backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::lobby::create_lobby,
        crate::routes::lobby::join_lobby,
        crate::routes::lobby::get_lobby_state,
        crate::routes::lobby::close_lobby,
        crate::routes::game::start_game,
        crate::routes::game::submit_guess,
        crate::routes::game::auto_submit_timeout,
        crate::routes::game::set_turn_prompt,
        crate::routes::game::attach_recording,
        crate::routes::sse::session_stream,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::common::SessionSummary,
            crate::dto::common::PlayerSummary,
            crate::dto::common::TurnSummary,
            crate::dto::lobby::CreateLobbyRequest,
            crate::dto::lobby::JoinLobbyRequest,
            crate::dto::lobby::CloseLobbyRequest,
            crate::dto::lobby::LobbyJoinedResponse,
            crate::dto::lobby::LobbyStateResponse,
            crate::dto::game::StartGameRequest,
            crate::dto::game::StartGameResponse,
            crate::dto::game::SubmitGuessRequest,
            crate::dto::game::TimeoutRequest,
            crate::dto::game::GuessResponse,
            crate::dto::game::TurnPromptRequest,
            crate::dto::game::AttachRecordingRequest,
            crate::dao::models::SessionStatus,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "lobby", description = "Lobby lifecycle operations"),
        (name = "game", description = "Turn progression and guessing"),
        (name = "sse", description = "Server-sent events streams"),
    )
)]
pub struct ApiDoc;
