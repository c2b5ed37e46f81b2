use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::auth::password::{hash_password, verify_password, PasswordError};
use crate::auth::{generate_jwt, Claims, JwtError};
use crate::config;
use crate::database::models::{NewUser, Role, User};
use crate::database::DatabaseError;
use crate::services::users::UserService;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("User with username {0} not found")]
    UserNotFound(String),

    #[error("Bad credentials")]
    BadCredentials,

    #[error("User with username {0} already exists")]
    UserExists(String),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Jwt(#[from] JwtError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Token response returned after a successful login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Credential verification and token issuance over the user store.
pub struct AuthService {
    users: Arc<dyn UserService>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserService>) -> Self {
        Self { users }
    }

    /// Check a username/password pair and issue a signed token on success.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthResponse, AuthError> {
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| AuthError::UserNotFound(username.to_string()))?;

        if !verify_password(password, &user.password)? {
            return Err(AuthError::BadCredentials);
        }

        let claims = Claims::new(user.username.clone(), user.role);
        let token = generate_jwt(&claims)?;
        info!("Issued token for user: {}", user.username);

        Ok(AuthResponse {
            access_token: token,
            token_type: "Bearer".to_string(),
            expires_in: config::config().security.jwt_expiry_hours as i64 * 3600,
        })
    }

    /// Create a user, hashing the password before it reaches the store.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        role: Role,
    ) -> Result<User, AuthError> {
        if self.users.find_by_username(username).await?.is_some() {
            return Err(AuthError::UserExists(username.to_string()));
        }

        let hashed = hash_password(password)?;
        let user = self
            .users
            .create(NewUser {
                username: username.to_string(),
                password: hashed,
                role,
            })
            .await?;

        info!("Registered user: {}", user.username);
        Ok(user)
    }
}
