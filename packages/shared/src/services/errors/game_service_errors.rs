use crate::repositories::errors::game_repository_errors::GameRepositoryError;

#[derive(Debug)]
pub enum GameServiceError {
    GameNotFound,
    GameAlreadyExists,
    ValidationError(String),
    RepositoryError(String),
}

impl std::fmt::Display for GameServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameServiceError::GameNotFound => write!(f, "Game not found"),
            GameServiceError::GameAlreadyExists => write!(f, "Game already exists"),
            GameServiceError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            GameServiceError::RepositoryError(msg) => write!(f, "Repository error: {}", msg),
        }
    }
}

impl std::error::Error for GameServiceError {}

impl From<GameRepositoryError> for GameServiceError {
    fn from(err: GameRepositoryError) -> Self {
        match err {
            GameRepositoryError::NotFound => GameServiceError::GameNotFound,
            GameRepositoryError::AlreadyExists => GameServiceError::GameAlreadyExists,
            other => GameServiceError::RepositoryError(other.to_string()),
        }
    }
}
