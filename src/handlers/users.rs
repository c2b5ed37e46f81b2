// handlers/users.rs - registration and authentication endpoints

use axum::extract::State;
use axum::response::Json;
use axum::routing::post;
use axum::Router;
use serde::Deserialize;

use crate::database::models::Role;
use crate::error::ApiError;
use crate::services::AuthResponse;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/user/add", post(register))
        .route("/user/authenticate", post(authenticate))
}

#[derive(Debug, Deserialize)]
pub struct UserPayload {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub role: Role,
}

impl UserPayload {
    fn validate(&self) -> Result<(), ApiError> {
        if self.username.trim().is_empty() {
            return Err(ApiError::bad_request("Username cannot be empty"));
        }
        if self.password.trim().is_empty() {
            return Err(ApiError::bad_request("Password cannot be empty"));
        }
        Ok(())
    }
}

/// POST /user/add - create a user; the password is hashed before storage
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<UserPayload>,
) -> Result<&'static str, ApiError> {
    payload.validate()?;

    state
        .auth
        .register(&payload.username, &payload.password, payload.role)
        .await?;

    Ok("User saved successfully")
}

/// POST /user/authenticate - verify credentials and issue a token
async fn authenticate(
    State(state): State<AppState>,
    Json(payload): Json<UserPayload>,
) -> Result<Json<AuthResponse>, ApiError> {
    let response = state
        .auth
        .authenticate(&payload.username, &payload.password)
        .await?;

    Ok(Json(response))
}
