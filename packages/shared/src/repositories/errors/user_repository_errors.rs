/// Failures from the user store, keyed by id or by username.
#[derive(Debug)]
pub enum UserRepositoryError {
    NotFound,
    AlreadyExists,
    Serialization(String),
    DynamoDb(String),
}

impl std::fmt::Display for UserRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRepositoryError::NotFound => write!(f, "No matching user record"),
            UserRepositoryError::AlreadyExists => write!(f, "A user with that username already exists"),
            UserRepositoryError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            UserRepositoryError::DynamoDb(msg) => write!(f, "Users table error: {}", msg),
        }
    }
}

impl std::error::Error for UserRepositoryError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_user_record() {
        assert_eq!(
            UserRepositoryError::AlreadyExists.to_string(),
            "A user with that username already exists"
        );
        assert_eq!(
            UserRepositoryError::DynamoDb("throttled".to_string()).to_string(),
            "Users table error: throttled"
        );
    }
}
