use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::lobby::{
        CloseLobbyRequest, CreateLobbyRequest, JoinLobbyRequest, LobbyJoinedResponse,
        LobbyStateResponse,
    },
    error::AppError,
    services::{game_service, lobby_service},
    state::SharedState,
};

/// Routes handling lobby lifecycle: creation, joining, inspection, closing.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/lobbies", post(create_lobby))
        .route("/lobbies/join", post(join_lobby))
        .route("/sessions/{id}", get(get_lobby_state).delete(close_lobby))
}

/// Open a new lobby with the caller as host.
#[utoipa::path(
    post,
    path = "/lobbies",
    tag = "lobby",
    request_body = CreateLobbyRequest,
    responses(
        (status = 200, description = "Lobby created", body = LobbyJoinedResponse),
        (status = 400, description = "Invalid display name"),
        (status = 503, description = "Storage unavailable")
    )
)]
pub async fn create_lobby(
    State(state): State<SharedState>,
    Json(payload): Json<CreateLobbyRequest>,
) -> Result<Json<LobbyJoinedResponse>, AppError> {
    payload.validate()?;
    let joined = lobby_service::create_lobby(&state, payload).await?;
    Ok(Json(joined))
}

/// Join an open lobby by its six-character code.
#[utoipa::path(
    post,
    path = "/lobbies/join",
    tag = "lobby",
    request_body = JoinLobbyRequest,
    responses(
        (status = 200, description = "Joined the lobby", body = LobbyJoinedResponse),
        (status = 404, description = "Unknown lobby code"),
        (status = 409, description = "Lobby closed or full")
    )
)]
pub async fn join_lobby(
    State(state): State<SharedState>,
    Json(payload): Json<JoinLobbyRequest>,
) -> Result<Json<LobbyJoinedResponse>, AppError> {
    payload.validate()?;
    let joined = lobby_service::join_lobby(&state, payload).await?;
    Ok(Json(joined))
}

/// Fetch the full session snapshot for rendering or resyncing.
#[utoipa::path(
    get,
    path = "/sessions/{id}",
    tag = "lobby",
    params(("id" = Uuid, Path, description = "Session identifier")),
    responses(
        (status = 200, description = "Session snapshot", body = LobbyStateResponse),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn get_lobby_state(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<LobbyStateResponse>, AppError> {
    let snapshot = game_service::get_lobby_state(&state, id).await?;
    Ok(Json(snapshot))
}

/// Close a lobby (host only) and purge all of its data immediately.
#[utoipa::path(
    delete,
    path = "/sessions/{id}",
    tag = "lobby",
    params(("id" = Uuid, Path, description = "Session identifier")),
    request_body = CloseLobbyRequest,
    responses(
        (status = 204, description = "Lobby closed and purged"),
        (status = 404, description = "Unknown session or player"),
        (status = 409, description = "Requester is not the host")
    )
)]
pub async fn close_lobby(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CloseLobbyRequest>,
) -> Result<axum::http::StatusCode, AppError> {
    lobby_service::close_lobby(&state, id, payload).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}
