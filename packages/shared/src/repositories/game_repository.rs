use crate::models::game::Game;
use crate::repositories::errors::game_repository_errors::GameRepositoryError;
use async_trait::async_trait;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::operation::transact_write_items::TransactWriteItemsError;
use aws_sdk_dynamodb::types::{AttributeValue, Delete, Put, TransactWriteItem};
use aws_sdk_dynamodb::Client;
use serde_dynamo::{from_item, to_item};
use tokio::sync::RwLock;

#[cfg(test)]
use mockall::automock;

const CONDITIONAL_CHECK_FAILED: &str = "ConditionalCheckFailed";

#[cfg_attr(test, automock)]
#[async_trait]
pub trait GameRepository: Send + Sync {
    async fn list_games(&self) -> Result<Vec<Game>, GameRepositoryError>;
    async fn get_game(&self, title: &str) -> Result<Game, GameRepositoryError>;
    async fn create_game(&self, game: &Game) -> Result<(), GameRepositoryError>;
    /// Replaces the record stored under `title`. The replacement may carry a
    /// different title, in which case the record is re-keyed.
    async fn update_game(&self, title: &str, game: &Game) -> Result<(), GameRepositoryError>;
    async fn delete_game(&self, title: &str) -> Result<(), GameRepositoryError>;
}

pub struct DynamoDbGameRepository {
    pub client: Client,
    pub table_name: String,
}

impl DynamoDbGameRepository {
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    fn key(title: &str) -> AttributeValue {
        AttributeValue::S(title.to_string())
    }

    async fn replace_in_place(&self, game: &Game) -> Result<(), GameRepositoryError> {
        let item = to_item(game).map_err(|e| GameRepositoryError::Serialization(e.to_string()))?;
        let result = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .condition_expression("attribute_exists(#title)")
            .expression_attribute_names("#title", "title")
            .send()
            .await;
        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                let err = e.into_service_error();
                if err.is_conditional_check_failed_exception() {
                    Err(GameRepositoryError::NotFound)
                } else {
                    Err(GameRepositoryError::DynamoDb(
                        DisplayErrorContext(&err).to_string(),
                    ))
                }
            }
        }
    }

    async fn rename(&self, title: &str, game: &Game) -> Result<(), GameRepositoryError> {
        let item = to_item(game).map_err(|e| GameRepositoryError::Serialization(e.to_string()))?;
        let delete = Delete::builder()
            .table_name(&self.table_name)
            .key("title", Self::key(title))
            .condition_expression("attribute_exists(#title)")
            .expression_attribute_names("#title", "title")
            .build()
            .map_err(|e| GameRepositoryError::DynamoDb(e.to_string()))?;
        let put = Put::builder()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .condition_expression("attribute_not_exists(#title)")
            .expression_attribute_names("#title", "title")
            .build()
            .map_err(|e| GameRepositoryError::DynamoDb(e.to_string()))?;

        let result = self
            .client
            .transact_write_items()
            .transact_items(TransactWriteItem::builder().delete(delete).build())
            .transact_items(TransactWriteItem::builder().put(put).build())
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) => match e.into_service_error() {
                TransactWriteItemsError::TransactionCanceledException(cancelled) => {
                    // Reasons are reported in the order the items were submitted.
                    let codes: Vec<Option<&str>> = cancelled
                        .cancellation_reasons()
                        .iter()
                        .map(|reason| reason.code())
                        .collect();
                    match codes.as_slice() {
                        [Some(CONDITIONAL_CHECK_FAILED), ..] => Err(GameRepositoryError::NotFound),
                        [_, Some(CONDITIONAL_CHECK_FAILED)] => {
                            Err(GameRepositoryError::AlreadyExists)
                        }
                        _ => Err(GameRepositoryError::DynamoDb(cancelled.to_string())),
                    }
                }
                other => Err(GameRepositoryError::DynamoDb(
                    DisplayErrorContext(&other).to_string(),
                )),
            },
        }
    }
}

#[async_trait]
impl GameRepository for DynamoDbGameRepository {
    async fn list_games(&self) -> Result<Vec<Game>, GameRepositoryError> {
        let mut games = Vec::new();
        let mut start_key = None;
        loop {
            let output = self
                .client
                .scan()
                .table_name(&self.table_name)
                .set_exclusive_start_key(start_key)
                .send()
                .await
                .map_err(|e| GameRepositoryError::DynamoDb(DisplayErrorContext(&e).to_string()))?;

            for item in output.items.unwrap_or_default() {
                let game: Game = from_item(item)
                    .map_err(|e| GameRepositoryError::Serialization(e.to_string()))?;
                games.push(game);
            }

            match output.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }
        Ok(games)
    }

    async fn get_game(&self, title: &str) -> Result<Game, GameRepositoryError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("title", Self::key(title))
            .send()
            .await
            .map_err(|e| GameRepositoryError::DynamoDb(DisplayErrorContext(&e).to_string()))?;
        match output.item {
            Some(item) => {
                from_item(item).map_err(|e| GameRepositoryError::Serialization(e.to_string()))
            }
            None => Err(GameRepositoryError::NotFound),
        }
    }

    async fn create_game(&self, game: &Game) -> Result<(), GameRepositoryError> {
        let item = to_item(game).map_err(|e| GameRepositoryError::Serialization(e.to_string()))?;
        let result = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .condition_expression("attribute_not_exists(#title)")
            .expression_attribute_names("#title", "title")
            .send()
            .await;
        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                let err = e.into_service_error();
                if err.is_conditional_check_failed_exception() {
                    Err(GameRepositoryError::AlreadyExists)
                } else {
                    Err(GameRepositoryError::DynamoDb(
                        DisplayErrorContext(&err).to_string(),
                    ))
                }
            }
        }
    }

    async fn update_game(&self, title: &str, game: &Game) -> Result<(), GameRepositoryError> {
        if game.title == title {
            self.replace_in_place(game).await
        } else {
            self.rename(title, game).await
        }
    }

    async fn delete_game(&self, title: &str) -> Result<(), GameRepositoryError> {
        let result = self
            .client
            .delete_item()
            .table_name(&self.table_name)
            .key("title", Self::key(title))
            .condition_expression("attribute_exists(#title)")
            .expression_attribute_names("#title", "title")
            .send()
            .await;
        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                let err = e.into_service_error();
                if err.is_conditional_check_failed_exception() {
                    Err(GameRepositoryError::NotFound)
                } else {
                    Err(GameRepositoryError::DynamoDb(
                        DisplayErrorContext(&err).to_string(),
                    ))
                }
            }
        }
    }
}

/// Process-local store keeping games in insertion order.
#[derive(Default)]
pub struct InMemoryGameRepository {
    games: RwLock<Vec<Game>>,
}

impl InMemoryGameRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_games(games: Vec<Game>) -> Self {
        Self {
            games: RwLock::new(games),
        }
    }
}

#[async_trait]
impl GameRepository for InMemoryGameRepository {
    async fn list_games(&self) -> Result<Vec<Game>, GameRepositoryError> {
        Ok(self.games.read().await.clone())
    }

    async fn get_game(&self, title: &str) -> Result<Game, GameRepositoryError> {
        self.games
            .read()
            .await
            .iter()
            .find(|game| game.title == title)
            .cloned()
            .ok_or(GameRepositoryError::NotFound)
    }

    async fn create_game(&self, game: &Game) -> Result<(), GameRepositoryError> {
        let mut games = self.games.write().await;
        if games.iter().any(|existing| existing.title == game.title) {
            return Err(GameRepositoryError::AlreadyExists);
        }
        games.push(game.clone());
        Ok(())
    }

    async fn update_game(&self, title: &str, game: &Game) -> Result<(), GameRepositoryError> {
        let mut games = self.games.write().await;
        let index = games
            .iter()
            .position(|existing| existing.title == title)
            .ok_or(GameRepositoryError::NotFound)?;
        if game.title != title && games.iter().any(|existing| existing.title == game.title) {
            return Err(GameRepositoryError::AlreadyExists);
        }
        games[index] = game.clone();
        Ok(())
    }

    async fn delete_game(&self, title: &str) -> Result<(), GameRepositoryError> {
        let mut games = self.games.write().await;
        let index = games
            .iter()
            .position(|existing| existing.title == title)
            .ok_or(GameRepositoryError::NotFound)?;
        games.remove(index);
        Ok(())
    }
}
