use sqlx::PgPool;
use std::sync::Arc;

use crate::services::{AuthService, PgProductService, PgUserService, ProductService, UserService};

/// Shared application state handed to every handler.
///
/// Services are trait objects so the test suites can run the router over
/// in-memory stores; `db_pool` is absent in that wiring.
#[derive(Clone)]
pub struct AppState {
    pub db_pool: Option<PgPool>,
    pub users: Arc<dyn UserService>,
    pub products: Arc<dyn ProductService>,
    pub auth: Arc<AuthService>,
}

impl AppState {
    /// Production wiring over a Postgres pool.
    pub fn new(pool: PgPool) -> Self {
        let users: Arc<dyn UserService> = Arc::new(PgUserService::new(pool.clone()));
        let products: Arc<dyn ProductService> = Arc::new(PgProductService::new(pool.clone()));
        Self::assemble(Some(pool), users, products)
    }

    /// Wiring over alternative stores.
    pub fn with_services(
        users: Arc<dyn UserService>,
        products: Arc<dyn ProductService>,
    ) -> Self {
        Self::assemble(None, users, products)
    }

    fn assemble(
        db_pool: Option<PgPool>,
        users: Arc<dyn UserService>,
        products: Arc<dyn ProductService>,
    ) -> Self {
        let auth = Arc::new(AuthService::new(users.clone()));
        Self {
            db_pool,
            users,
            products,
            auth,
        }
    }

    /// Database reachability, used by the health endpoint.
    pub async fn is_db_healthy(&self) -> bool {
        match &self.db_pool {
            Some(pool) => crate::database::health_check(pool).await.is_ok(),
            None => false,
        }
    }
}
