use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

use crate::database::models::{NewUser, User};
use crate::database::DatabaseError;

/// Read/write access to the user store.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Look up a user by username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError>;

    /// Insert a new user record. The password must already be hashed.
    async fn create(&self, user: NewUser) -> Result<User, DatabaseError>;
}

pub struct PgUserService {
    pool: PgPool,
}

impl PgUserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserService for PgUserService {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        info!("Attempting to load user by username: {}", username);

        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password, role FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        if user.is_some() {
            info!("User loaded successfully: {}", username);
        }

        Ok(user)
    }

    async fn create(&self, user: NewUser) -> Result<User, DatabaseError> {
        let created = sqlx::query_as::<_, User>(
            "INSERT INTO users (username, password, role)
             VALUES ($1, $2, $3)
             RETURNING id, username, password, role",
        )
        .bind(&user.username)
        .bind(&user.password)
        .bind(user.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        info!("Created user: {}", created.username);
        Ok(created)
    }
}
