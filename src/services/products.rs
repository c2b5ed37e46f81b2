use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, info};

use crate::database::models::Product;
use crate::database::DatabaseError;
use crate::types::{Page, PageRequest};

/// Bulk persistence and paginated reads over the product store.
#[async_trait]
pub trait ProductService: Send + Sync {
    /// Persist all records; all-or-nothing within one transaction.
    async fn save_products(&self, records: Vec<Product>) -> Result<(), DatabaseError>;

    /// One page of products ordered by id.
    async fn list_products(&self, request: PageRequest) -> Result<Page<Product>, DatabaseError>;
}

pub struct PgProductService {
    pool: PgPool,
}

impl PgProductService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductService for PgProductService {
    async fn save_products(&self, records: Vec<Product>) -> Result<(), DatabaseError> {
        debug!("Saving {} product records", records.len());

        let mut tx = self.pool.begin().await?;
        for record in &records {
            sqlx::query(
                "INSERT INTO products (id, entry_date, item_code, item_name, item_quantity, status)
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(record.id)
            .bind(record.date)
            .bind(&record.item_code)
            .bind(&record.item_name)
            .bind(record.item_quantity)
            .bind(&record.status)
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::from_query)?;
        }
        tx.commit().await?;

        info!("Saved {} product records", records.len());
        Ok(())
    }

    async fn list_products(&self, request: PageRequest) -> Result<Page<Product>, DatabaseError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        let rows = sqlx::query_as::<_, Product>(
            "SELECT id, entry_date, item_code, item_name, item_quantity, status
             FROM products
             ORDER BY id
             LIMIT $1 OFFSET $2",
        )
        .bind(request.limit())
        .bind(request.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(Page::new(rows, request, total))
    }
}
