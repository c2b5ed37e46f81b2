#![allow(dead_code)]

use std::collections::HashMap;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::NaiveDate;
use tower::ServiceExt;

use catalog_api::auth::password::hash_password;
use catalog_api::database::models::{NewUser, Product, Role, User};
use catalog_api::database::DatabaseError;
use catalog_api::services::{ProductService, UserService};
use catalog_api::types::{Page, PageRequest};
use catalog_api::AppState;

pub const SEED_USERNAME: &str = "john";
pub const SEED_PASSWORD: &str = "123";

/// In-memory user store for running the router without Postgres.
pub struct MemoryUserService {
    users: Mutex<HashMap<String, User>>,
    next_id: AtomicI64,
}

impl MemoryUserService {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Store seeded with the stock login used across the suites.
    pub fn seeded() -> Self {
        let store = Self::new();
        store.insert(NewUser {
            username: SEED_USERNAME.to_string(),
            password: seed_password_hash().to_string(),
            role: Role::User,
        });
        store
    }

    fn insert(&self, user: NewUser) -> User {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let user = User {
            id,
            username: user.username,
            password: user.password,
            role: user.role,
        };
        self.users
            .lock()
            .unwrap()
            .insert(user.username.clone(), user.clone());
        user
    }
}

#[async_trait]
impl UserService for MemoryUserService {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        Ok(self.users.lock().unwrap().get(username).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, DatabaseError> {
        if self.users.lock().unwrap().contains_key(&user.username) {
            return Err(DatabaseError::Integrity(
                "duplicate key value violates unique constraint \"users_username_key\""
                    .to_string(),
            ));
        }
        Ok(self.insert(user))
    }
}

/// In-memory product store. `fail_with` makes every call surface an
/// integrity error with that message, for exercising the 500 path.
pub struct MemoryProductService {
    products: Mutex<Vec<Product>>,
    fail_with: Option<String>,
}

impl MemoryProductService {
    pub fn empty() -> Self {
        Self {
            products: Mutex::new(Vec::new()),
            fail_with: None,
        }
    }

    /// Store seeded with the two-record fixture the list tests expect.
    pub fn with_fixture() -> Self {
        let entry_date = NaiveDate::from_ymd_opt(2023, 1, 3).unwrap();
        Self {
            products: Mutex::new(vec![
                Product {
                    id: 1,
                    date: entry_date,
                    item_code: "11111".to_string(),
                    item_name: "Fina Lika".to_string(),
                    item_quantity: 30,
                    status: "Paid".to_string(),
                },
                Product {
                    id: 2,
                    date: entry_date,
                    item_code: "11111".to_string(),
                    item_name: "Test Inventory 2".to_string(),
                    item_quantity: 20,
                    status: "Paid".to_string(),
                },
            ]),
            fail_with: None,
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            products: Mutex::new(Vec::new()),
            fail_with: Some(message.to_string()),
        }
    }
}

#[async_trait]
impl ProductService for MemoryProductService {
    async fn save_products(&self, records: Vec<Product>) -> Result<(), DatabaseError> {
        if let Some(message) = &self.fail_with {
            return Err(DatabaseError::Integrity(message.clone()));
        }

        let mut products = self.products.lock().unwrap();
        for record in records {
            if products.iter().any(|p| p.id == record.id) {
                return Err(DatabaseError::Integrity(
                    "duplicate key value violates unique constraint \"products_pkey\""
                        .to_string(),
                ));
            }
            products.push(record);
        }
        Ok(())
    }

    async fn list_products(&self, request: PageRequest) -> Result<Page<Product>, DatabaseError> {
        if let Some(message) = &self.fail_with {
            return Err(DatabaseError::Integrity(message.clone()));
        }

        let mut products = self.products.lock().unwrap().clone();
        products.sort_by_key(|p| p.id);

        let total = products.len() as i64;
        let content: Vec<Product> = products
            .into_iter()
            .skip(request.offset() as usize)
            .take(request.limit() as usize)
            .collect();

        Ok(Page::new(content, request, total))
    }
}

/// Router over a seeded user store and the given product store.
pub fn app_with_products(products: MemoryProductService) -> Router {
    let users: Arc<dyn UserService> = Arc::new(MemoryUserService::seeded());
    let products: Arc<dyn ProductService> = Arc::new(products);
    catalog_api::app(AppState::with_services(users, products))
}

/// Router over seeded in-memory stores.
pub fn test_app() -> Router {
    app_with_products(MemoryProductService::with_fixture())
}

/// Router whose product store fails every call with the given message.
pub fn failing_app(message: &str) -> Router {
    app_with_products(MemoryProductService::failing(message))
}

fn seed_password_hash() -> &'static str {
    // Hash once; bcrypt at default cost is too slow to repeat per test
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| hash_password(SEED_PASSWORD).expect("failed to hash seed password"))
}

pub async fn post_json(
    app: &Router,
    uri: &str,
    token: Option<&str>,
    payload: &serde_json::Value,
) -> Result<(StatusCode, String)> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }

    let request = builder.body(Body::from(serde_json::to_vec(payload)?))?;
    send(app, request).await
}

pub async fn get_path(app: &Router, uri: &str, token: Option<&str>) -> Result<(StatusCode, String)> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }

    let request = builder.body(Body::empty())?;
    send(app, request).await
}

async fn send(app: &Router, request: Request<Body>) -> Result<(StatusCode, String)> {
    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok((status, String::from_utf8(bytes.to_vec())?))
}

/// Authenticate as the seeded user and return the issued token.
pub async fn login_token(app: &Router) -> Result<String> {
    let payload = serde_json::json!({
        "username": SEED_USERNAME,
        "password": SEED_PASSWORD,
    });
    let (status, body) = post_json(app, "/user/authenticate", None, &payload).await?;
    anyhow::ensure!(status == StatusCode::OK, "login failed with {}: {}", status, body);

    let value: serde_json::Value = serde_json::from_str(&body)?;
    let token = value["accessToken"]
        .as_str()
        .context("accessToken missing from login response")?;
    Ok(token.to_string())
}

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Spawn the already-built binary to keep start fast during tests
        // Assumes debug profile; adjust if you run tests with --release
        let mut cmd = Command::new("target/debug/catalog-api");
        cmd.env("CATALOG_API_PORT", port.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        // Inherit environment so the server can see DATABASE_URL and JWT_SECRET from .env (loaded by the server)
        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline { break; }
            let url = format!("{}/health", self.base_url);
            match client.get(&url).send().await {
                Ok(resp) => {
                    // Consider server ready on any non-404 response
                    if resp.status() == reqwest::StatusCode::OK
                        || resp.status() == reqwest::StatusCode::SERVICE_UNAVAILABLE
                    {
                        return Ok(());
                    }
                }
                Err(_) => {}
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    // Use stable get_or_init and convert init errors into a panic with context.
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}
