// handlers/products.rs - bulk add and paginated list endpoints

use axum::extract::{Query, State};
use axum::response::Json;
use axum::routing::{get, post};
use axum::{Extension, Router};
use serde::Deserialize;
use tracing::debug;

use crate::config;
use crate::database::models::Product;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;
use crate::types::{Page, PageRequest};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products/add", post(add_products))
        .route("/products/all", get(list_products))
}

/// Bulk-add request: target table name plus the records to insert.
#[derive(Debug, Deserialize)]
pub struct ProductPayload {
    pub table: String,
    pub records: Vec<Product>,
}

impl ProductPayload {
    fn validate(&self) -> Result<(), ApiError> {
        if self.table.trim().is_empty() {
            return Err(ApiError::bad_request("Table name cannot be empty"));
        }
        if self.records.is_empty() {
            return Err(ApiError::bad_request("Product records cannot be empty"));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
}

/// POST /products/add - persist a batch of product records
async fn add_products(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(payload): Json<ProductPayload>,
) -> Result<&'static str, ApiError> {
    payload.validate()?;
    debug!(
        "User {} adding {} records to {}",
        auth_user.username,
        payload.records.len(),
        payload.table
    );

    state.products.save_products(payload.records).await?;
    Ok("Records saved successfully")
}

/// GET /products/all - one page of products ordered by id
async fn list_products(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page<Product>>, ApiError> {
    let request = PageRequest::new(
        query.page.unwrap_or(0),
        query
            .size
            .unwrap_or(config::config().api.default_page_size),
    );
    debug!(
        "User {} listing products (page {}, size {})",
        auth_user.username,
        request.page(),
        request.size()
    );

    let page = state.products.list_products(request).await?;
    Ok(Json(page))
}
