use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod state;
pub mod types;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Public user routes
        .merge(handlers::users::routes())
        // Protected product API
        .merge(
            handlers::products::routes()
                .route_layer(from_fn(middleware::jwt_auth_middleware)),
        )
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "Catalog API",
        "version": version,
        "description": "Product catalog CRUD backend with JWT authentication",
        "endpoints": {
            "home": "/ (public)",
            "health": "/health (public)",
            "users": "/user/add, /user/authenticate (public)",
            "products": "/products/add, /products/all (protected)",
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    if state.is_db_healthy().await {
        (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "degraded",
                "timestamp": now,
                "database": "unavailable"
            })),
        )
    }
}
