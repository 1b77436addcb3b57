use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::{error::ApiError, middleware::auth::AuthenticatedUser, state::AppState};
use shared::models::game::Game;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/games", get(list_games).post(create_game))
        .route(
            "/api/games/{title}",
            get(get_game).put(update_game).delete(delete_game),
        )
        .route("/games", get(game_feed))
}

/// Envelope served by the public, read-only collection feed.
#[derive(Debug, Serialize, Deserialize)]
pub struct GameFeedResponse {
    pub games: Vec<Game>,
}

async fn list_games(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<Json<Vec<Game>>, ApiError> {
    state.game_service.list_games().await.map(Json).map_err(|e| {
        error!("Failed to list games: {}", e);
        ApiError::from(e)
    })
}

async fn game_feed(State(state): State<AppState>) -> Result<Json<GameFeedResponse>, ApiError> {
    state
        .game_service
        .list_games()
        .await
        .map(|games| Json(GameFeedResponse { games }))
        .map_err(|e| {
            error!("Failed to build game feed: {}", e);
            ApiError::from(e)
        })
}

async fn get_game(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(title): Path<String>,
) -> Result<Json<Game>, ApiError> {
    state.game_service.get_game(&title).await.map(Json).map_err(|e| {
        debug!("Failed to get game {}: {}", title, e);
        ApiError::from(e)
    })
}

async fn create_game(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    payload: Result<Json<Game>, JsonRejection>,
) -> Result<(StatusCode, Json<Game>), ApiError> {
    let Json(game) = payload?;
    let created = state.game_service.create_game(game).await.map_err(|e| {
        error!("Failed to create game: {}", e);
        ApiError::from(e)
    })?;
    debug!("Game {} created by {}", created.title, user.user_id);
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_game(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(title): Path<String>,
    payload: Result<Json<Game>, JsonRejection>,
) -> Result<Json<Game>, ApiError> {
    let Json(game) = payload?;
    let updated = state
        .game_service
        .update_game(&title, game)
        .await
        .map_err(|e| {
            error!("Failed to update game {}: {}", title, e);
            ApiError::from(e)
        })?;
    debug!("Game {} updated by {}", title, user.user_id);
    Ok(Json(updated))
}

async fn delete_game(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(title): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.game_service.delete_game(&title).await.map_err(|e| {
        error!("Failed to delete game {}: {}", title, e);
        ApiError::from(e)
    })?;
    debug!("Game {} deleted by {}", title, user.user_id);
    Ok(StatusCode::NO_CONTENT)
}
