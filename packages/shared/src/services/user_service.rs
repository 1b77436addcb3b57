use std::sync::Arc;

use crate::models::user::User;
use crate::repositories::user_repository::UserRepository;
use crate::services::errors::user_service_errors::UserServiceError;

pub struct UserService {
    repository: Arc<dyn UserRepository + Send + Sync>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository + Send + Sync>) -> Self {
        UserService { repository }
    }

    pub async fn create_user(&self, username: &str, password: &str) -> Result<User, UserServiceError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(UserServiceError::ValidationError(
                "Username or password cannot be empty".to_string(),
            ));
        }
        if self.repository.username_exists(username).await? {
            return Err(UserServiceError::UserAlreadyExists);
        }
        let user = User::new(username.to_string(), password);
        self.repository.create_user(&user).await?;
        Ok(user)
    }

    pub async fn get_user_by_id(&self, user_id: &str) -> Result<User, UserServiceError> {
        if user_id.is_empty() {
            return Err(UserServiceError::ValidationError(
                "User ID cannot be empty".to_string(),
            ));
        }
        Ok(self.repository.get_user_by_id(user_id).await?)
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<User, UserServiceError> {
        if username.is_empty() {
            return Err(UserServiceError::ValidationError(
                "Username cannot be empty".to_string(),
            ));
        }
        Ok(self.repository.get_user_by_username(username).await?)
    }
}
