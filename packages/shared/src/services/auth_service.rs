use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use std::sync::Arc;

use crate::models::auth::responses::{LoginResponse, TokenClaims};
use crate::models::user::User;
use crate::services::errors::auth_service_errors::AuthServiceError;
use crate::services::errors::user_service_errors::UserServiceError;
use crate::services::user_service::UserService;

pub trait AuthServiceTrait: Send + Sync {
    async fn register_user(
        &self,
        username: &str,
        password: &str,
    ) -> Result<LoginResponse, AuthServiceError>;
    async fn authenticate_user(
        &self,
        username: &str,
        password: &str,
    ) -> Result<LoginResponse, AuthServiceError>;
    fn verify_token(&self, token: &str) -> Result<TokenClaims, AuthServiceError>;
    fn extract_user_id_from_token(&self, token: &str) -> Result<String, AuthServiceError>;
    fn generate_token(&self, user: &User) -> Result<LoginResponse, AuthServiceError>;
}

pub struct AuthService {
    user_service: Arc<UserService>,
    jwt_secret: String,
    token_ttl: Duration,
}

impl AuthService {
    pub fn new(user_service: Arc<UserService>, jwt_secret: String, token_ttl_hours: i64) -> Self {
        AuthService {
            user_service,
            jwt_secret,
            token_ttl: Duration::hours(token_ttl_hours),
        }
    }
}

impl AuthServiceTrait for AuthService {
    async fn register_user(
        &self,
        username: &str,
        password: &str,
    ) -> Result<LoginResponse, AuthServiceError> {
        let user = self
            .user_service
            .create_user(username, password)
            .await
            .map_err(|e| match e {
                UserServiceError::ValidationError(msg) => AuthServiceError::ValidationError(msg),
                other => AuthServiceError::UserServiceError(other),
            })?;
        self.generate_token(&user)
    }

    async fn authenticate_user(
        &self,
        username: &str,
        password: &str,
    ) -> Result<LoginResponse, AuthServiceError> {
        if username.is_empty() || password.is_empty() {
            return Err(AuthServiceError::ValidationError(
                "Username or password cannot be empty".to_string(),
            ));
        }

        match self.user_service.get_user_by_username(username).await {
            Ok(user) if user.verify_password(password) => self.generate_token(&user),
            Ok(_) | Err(UserServiceError::UserNotFound) => Err(AuthServiceError::InvalidCredentials),
            Err(err) => Err(AuthServiceError::UserServiceError(err)),
        }
    }

    fn generate_token(&self, user: &User) -> Result<LoginResponse, AuthServiceError> {
        let now = Utc::now();
        let claims = TokenClaims {
            sub: user.id.clone(),
            username: user.username.clone(),
            exp: (now + self.token_ttl).timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )
        .map_err(|e| AuthServiceError::JwtError(format!("{:#?}", e)))?;

        Ok(LoginResponse {
            token,
            token_type: "Bearer".to_string(),
            expires_in: self.token_ttl.num_seconds(),
        })
    }

    fn verify_token(&self, token: &str) -> Result<TokenClaims, AuthServiceError> {
        let decoding_key = DecodingKey::from_secret(self.jwt_secret.as_ref());
        let validation = Validation::default();

        match decode::<TokenClaims>(token, &decoding_key, &validation) {
            Ok(token_data) => {
                let now = Utc::now().timestamp() as usize;
                if token_data.claims.exp < now {
                    Err(AuthServiceError::ExpiredToken)
                } else {
                    Ok(token_data.claims)
                }
            }
            Err(err) => match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    Err(AuthServiceError::ExpiredToken)
                }
                _ => Err(AuthServiceError::InvalidToken),
            },
        }
    }

    fn extract_user_id_from_token(&self, token: &str) -> Result<String, AuthServiceError> {
        let claims = self.verify_token(token)?;
        Ok(claims.sub)
    }
}
