use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use shared::models::game::{Game, GameFeed};
use shared::repositories::game_repository::{
    DynamoDbGameRepository, GameRepository, InMemoryGameRepository,
};
use shared::repositories::user_repository::{
    DynamoDbUserRepository, InMemoryUserRepository, UserRepository,
};
use shared::services::auth_service::AuthService;
use shared::services::game_service::GameService;
use shared::services::user_service::UserService;

use crate::config::{AppConfig, ConfigError, StorageBackend};

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub user_service: Arc<UserService>,
    pub game_service: Arc<GameService>,
}

impl AppState {
    pub fn new(
        game_repository: Arc<dyn GameRepository + Send + Sync>,
        user_repository: Arc<dyn UserRepository + Send + Sync>,
        jwt_secret: String,
        token_ttl_hours: i64,
    ) -> Self {
        let user_service = Arc::new(UserService::new(user_repository));
        let auth_service = Arc::new(AuthService::new(
            user_service.clone(),
            jwt_secret,
            token_ttl_hours,
        ));
        let game_service = Arc::new(GameService::new(game_repository));

        AppState {
            auth_service,
            user_service,
            game_service,
        }
    }

    /// State backed by process-local stores, pre-populated with `games`.
    pub fn in_memory(games: Vec<Game>, jwt_secret: &str) -> Self {
        Self::new(
            Arc::new(InMemoryGameRepository::with_games(games)),
            Arc::new(InMemoryUserRepository::new()),
            jwt_secret.to_string(),
            24,
        )
    }

    pub async fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        match config.storage {
            StorageBackend::Memory => {
                let games = match &config.games_seed {
                    Some(path) => load_seed(path).await?,
                    None => Vec::new(),
                };
                info!("Using in-memory storage with {} seeded games", games.len());
                Ok(Self::new(
                    Arc::new(InMemoryGameRepository::with_games(games)),
                    Arc::new(InMemoryUserRepository::new()),
                    config.jwt_secret.clone(),
                    config.token_ttl_hours,
                ))
            }
            StorageBackend::DynamoDb => {
                if config.games_seed.is_some() {
                    warn!("GAMES_SEED is ignored with the dynamodb storage backend");
                }
                let aws_config = aws_config::load_from_env().await;
                let client = aws_sdk_dynamodb::Client::new(&aws_config);
                info!(
                    "Using DynamoDB tables {} and {}",
                    config.games_table, config.users_table
                );
                Ok(Self::new(
                    Arc::new(DynamoDbGameRepository::new(
                        client.clone(),
                        config.games_table.clone(),
                    )),
                    Arc::new(DynamoDbUserRepository::new(
                        client,
                        config.users_table.clone(),
                    )),
                    config.jwt_secret.clone(),
                    config.token_ttl_hours,
                ))
            }
        }
    }
}

/// Reads a JSON seed file holding either a bare array of games or a
/// `{"games": [...]}` envelope.
///
/// Every entry must pass the same checks as a created game, and titles must
/// be unique.
pub async fn load_seed(path: &Path) -> Result<Vec<Game>, ConfigError> {
    let seed_error = |msg: String| ConfigError::Seed(format!("{}: {}", path.display(), msg));

    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| seed_error(e.to_string()))?;
    let feed: GameFeed = serde_json::from_str(&raw).map_err(|e| seed_error(e.to_string()))?;

    let mut games: Vec<Game> = Vec::new();
    for (index, game) in feed.into_games().into_iter().enumerate() {
        let game = game.normalized();
        let missing = game.missing_fields();
        if !missing.is_empty() {
            return Err(seed_error(format!(
                "entry {} is missing required fields: {}",
                index,
                missing.join(", ")
            )));
        }
        if games.iter().any(|existing| existing.title == game.title) {
            return Err(seed_error(format!("duplicate title {:?}", game.title)));
        }
        games.push(game);
    }
    Ok(games)
}
