use crate::repositories::errors::user_repository_errors::UserRepositoryError;

#[derive(Debug)]
pub enum UserServiceError {
    UserNotFound,
    UserAlreadyExists,
    ValidationError(String),
    RepositoryError(String),
}

impl std::fmt::Display for UserServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserServiceError::UserNotFound => write!(f, "User not found"),
            UserServiceError::UserAlreadyExists => write!(f, "User already exists"),
            UserServiceError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            UserServiceError::RepositoryError(msg) => write!(f, "Repository error: {}", msg),
        }
    }
}

impl std::error::Error for UserServiceError {}

impl From<UserRepositoryError> for UserServiceError {
    fn from(err: UserRepositoryError) -> Self {
        match err {
            UserRepositoryError::NotFound => UserServiceError::UserNotFound,
            UserRepositoryError::AlreadyExists => UserServiceError::UserAlreadyExists,
            other => UserServiceError::RepositoryError(other.to_string()),
        }
    }
}
