use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config;

pub mod models;

pub use models::{NewUser, Product, Role, User};

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    // Message passes through verbatim; persistence failures surface it as
    // the HTTP response body.
    #[error("{0}")]
    Integrity(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Wrap a query failure, surfacing database-reported errors (constraint
    /// violations and the like) with their own message.
    pub fn from_query(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db) => DatabaseError::Integrity(db.message().to_string()),
            other => DatabaseError::Sqlx(other),
        }
    }
}

/// Open the connection pool against `DATABASE_URL`.
pub async fn connect() -> Result<PgPool, DatabaseError> {
    let url =
        std::env::var("DATABASE_URL").map_err(|_| DatabaseError::ConfigMissing("DATABASE_URL"))?;

    let db_config = &config::config().database;
    let pool = PgPoolOptions::new()
        .max_connections(db_config.max_connections)
        .acquire_timeout(Duration::from_secs(db_config.connection_timeout))
        .connect(&url)
        .await?;

    info!("Connected database pool ({} max connections)", db_config.max_connections);
    Ok(pool)
}

/// Create the `users` and `products` tables when they do not exist yet.
///
/// One statement per call; prepared statements cannot carry multiple
/// commands.
pub async fn init_schema(pool: &PgPool) -> Result<(), DatabaseError> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS users (
            id BIGSERIAL PRIMARY KEY,
            username VARCHAR(255) NOT NULL UNIQUE,
            password VARCHAR(255) NOT NULL,
            role VARCHAR(32) NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS products (
            id BIGINT PRIMARY KEY,
            entry_date DATE NOT NULL,
            item_code VARCHAR(255) NOT NULL,
            item_name VARCHAR(255) NOT NULL,
            item_quantity INTEGER NOT NULL,
            status VARCHAR(255) NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    info!("Database schema ready");
    Ok(())
}

/// Pings the pool to ensure connectivity
pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
