use std::sync::Arc;

use tracing::debug;

use crate::models::game::Game;
use crate::repositories::game_repository::GameRepository;
use crate::services::errors::game_service_errors::GameServiceError;

pub struct GameService {
    repository: Arc<dyn GameRepository + Send + Sync>,
}

impl GameService {
    pub fn new(repository: Arc<dyn GameRepository + Send + Sync>) -> Self {
        GameService { repository }
    }

    pub async fn list_games(&self) -> Result<Vec<Game>, GameServiceError> {
        let games = self.repository.list_games().await?;
        debug!("Listed {} games", games.len());
        Ok(games)
    }

    pub async fn get_game(&self, title: &str) -> Result<Game, GameServiceError> {
        check_title(title)?;
        Ok(self.repository.get_game(title).await?)
    }

    pub async fn create_game(&self, game: Game) -> Result<Game, GameServiceError> {
        let game = validated(game)?;
        self.repository.create_game(&game).await?;
        Ok(game)
    }

    /// Replaces the game stored under `title` and returns the stored form.
    pub async fn update_game(&self, title: &str, game: Game) -> Result<Game, GameServiceError> {
        check_title(title)?;
        let game = validated(game)?;
        self.repository.update_game(title, &game).await?;
        Ok(game)
    }

    pub async fn delete_game(&self, title: &str) -> Result<(), GameServiceError> {
        check_title(title)?;
        Ok(self.repository.delete_game(title).await?)
    }
}

fn check_title(title: &str) -> Result<(), GameServiceError> {
    if title.trim().is_empty() {
        return Err(GameServiceError::ValidationError(
            "Title cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn validated(game: Game) -> Result<Game, GameServiceError> {
    let game = game.normalized();
    let missing = game.missing_fields();
    if !missing.is_empty() {
        return Err(GameServiceError::ValidationError(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }
    Ok(game)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::errors::game_repository_errors::GameRepositoryError;
    use crate::repositories::game_repository::MockGameRepository;

    fn halo() -> Game {
        Game::new("Halo Infinite", "Master Chief returns", "halo-infinite")
    }

    #[tokio::test]
    async fn test_get_game_not_found() {
        let mut mock_repo = MockGameRepository::new();
        mock_repo
            .expect_get_game()
            .withf(|title| title == "Halo Infinite")
            .times(1)
            .returning(|_| Err(GameRepositoryError::NotFound));

        let service = GameService::new(Arc::new(mock_repo));
        let result = service.get_game("Halo Infinite").await;

        assert!(matches!(result, Err(GameServiceError::GameNotFound)));
    }

    #[tokio::test]
    async fn test_get_game_rejects_blank_title() {
        let mut mock_repo = MockGameRepository::new();
        mock_repo.expect_get_game().never();

        let service = GameService::new(Arc::new(mock_repo));
        let result = service.get_game("   ").await;

        assert!(matches!(result, Err(GameServiceError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_create_game_stores_normalized_game() {
        let mut mock_repo = MockGameRepository::new();
        mock_repo
            .expect_create_game()
            .withf(|game| *game == halo())
            .times(1)
            .returning(|_| Ok(()));

        let service = GameService::new(Arc::new(mock_repo));
        let submitted = Game {
            title: " Halo Infinite ".to_string(),
            image_url: Some(String::new()),
            ..halo()
        };

        let created = service.create_game(submitted).await.unwrap();
        assert_eq!(created, halo());
    }

    #[tokio::test]
    async fn test_create_game_missing_fields() {
        let mut mock_repo = MockGameRepository::new();
        mock_repo.expect_create_game().never();

        let service = GameService::new(Arc::new(mock_repo));
        let result = service.create_game(Game::new("Halo", " ", "")).await;

        match result {
            Err(GameServiceError::ValidationError(msg)) => {
                assert_eq!(msg, "Missing required fields: description, href");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_game_duplicate() {
        let mut mock_repo = MockGameRepository::new();
        mock_repo
            .expect_create_game()
            .returning(|_| Err(GameRepositoryError::AlreadyExists));

        let service = GameService::new(Arc::new(mock_repo));
        let result = service.create_game(halo()).await;

        assert!(matches!(result, Err(GameServiceError::GameAlreadyExists)));
    }

    #[tokio::test]
    async fn test_update_game_returns_stored_form() {
        let mut mock_repo = MockGameRepository::new();
        mock_repo
            .expect_update_game()
            .withf(|title, game| title == "Halo Infinite" && game.description == "Updated")
            .times(1)
            .returning(|_, _| Ok(()));

        let service = GameService::new(Arc::new(mock_repo));
        let submitted = Game {
            description: "  Updated  ".to_string(),
            ..halo()
        };

        let updated = service.update_game("Halo Infinite", submitted).await.unwrap();
        assert_eq!(updated.description, "Updated");
    }

    #[tokio::test]
    async fn test_repository_failure_is_wrapped() {
        let mut mock_repo = MockGameRepository::new();
        mock_repo
            .expect_list_games()
            .returning(|| Err(GameRepositoryError::DynamoDb("throttled".to_string())));

        let service = GameService::new(Arc::new(mock_repo));
        let result = service.list_games().await;

        match result {
            Err(GameServiceError::RepositoryError(msg)) => assert!(msg.contains("throttled")),
            other => panic!("expected repository error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_delete_game_not_found() {
        let mut mock_repo = MockGameRepository::new();
        mock_repo
            .expect_delete_game()
            .returning(|_| Err(GameRepositoryError::NotFound));

        let service = GameService::new(Arc::new(mock_repo));
        let result = service.delete_game("Halo Infinite").await;

        assert!(matches!(result, Err(GameServiceError::GameNotFound)));
    }
}
