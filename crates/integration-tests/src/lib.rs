//! Integration tests for Savat.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p savat-integration-tests
//! ```
//!
//! No external services are needed. [`MockBackend`] serves the same REST
//! routes as the real backend from an in-process axum server, and
//! [`TestContext`] points a [`Storefront`] at it with file-backed storage in a
//! temporary directory.
//!
//! # Seed Data
//!
//! - Products 1-4 across the `bags` and `tech` categories
//! - [`ADMIN_EMAIL`] / [`ADMIN_PASSWORD`] with the admin role
//! - [`CUSTOMER_EMAIL`] / [`CUSTOMER_PASSWORD`] with the customer role

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use tempfile::TempDir;
use url::Url;

use savat_storefront::Storefront;
use savat_storefront::config::{ApiConfig, StorefrontConfig};

pub const ADMIN_EMAIL: &str = "admin@savat.test";
pub const ADMIN_PASSWORD: &str = "admin123";
pub const CUSTOMER_EMAIL: &str = "ali@savat.test";
pub const CUSTOMER_PASSWORD: &str = "secret1";

/// User ID the seeded customer signs in as.
pub const CUSTOMER_ID: u64 = 2;

// =============================================================================
// Mock Backend
// =============================================================================

struct Account {
    id: u64,
    name: String,
    email: String,
    password: String,
    role: &'static str,
}

impl Account {
    fn to_json(&self) -> Value {
        json!({ "id": self.id, "name": self.name, "email": self.email, "role": self.role })
    }
}

#[derive(Default)]
struct BackendState {
    products: Vec<Value>,
    accounts: Vec<Account>,
    orders: Vec<Value>,
    /// Issued token -> user ID
    tokens: HashMap<String, u64>,
    requests: usize,
}

impl BackendState {
    fn seeded() -> Self {
        let products = [
            (1, "Canvas Backpack", "109.95", "bags"),
            (2, "Leather Tote", "55.99", "bags"),
            (3, "Wireless Mouse", "22.30", "tech"),
            (4, "USB-C Hub", "15.99", "tech"),
        ]
        .into_iter()
        .map(|(id, title, price, category)| {
            json!({
                "id": id,
                "title": title,
                "price": price,
                "description": format!("{title} description"),
                "category": category,
                "image": format!("https://img.savat.test/{id}.png"),
                "rating": { "rate": 4.5, "count": 120 }
            })
        })
        .collect();

        let accounts = vec![
            Account {
                id: 1,
                name: "Admin".to_string(),
                email: ADMIN_EMAIL.to_string(),
                password: ADMIN_PASSWORD.to_string(),
                role: "ADMIN",
            },
            Account {
                id: CUSTOMER_ID,
                name: "Ali".to_string(),
                email: CUSTOMER_EMAIL.to_string(),
                password: CUSTOMER_PASSWORD.to_string(),
                role: "customer",
            },
        ];

        Self {
            products,
            accounts,
            ..Self::default()
        }
    }

    fn issue_token(&mut self, user_id: u64) -> String {
        let token = format!("token-{user_id}-{}", self.tokens.len() + 1);
        self.tokens.insert(token.clone(), user_id);
        token
    }

    fn caller(&self, headers: &HeaderMap) -> Option<&Account> {
        let token = headers
            .get("authorization")?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")?;
        let user_id = self.tokens.get(token)?;
        self.accounts.iter().find(|account| account.id == *user_id)
    }
}

type Shared = Arc<Mutex<BackendState>>;

/// An in-process backend listening on a random local port.
#[derive(Clone)]
pub struct MockBackend {
    base_url: Url,
    state: Shared,
}

impl MockBackend {
    /// Bind and start serving the seeded backend.
    ///
    /// # Errors
    ///
    /// Returns an error if no local port can be bound.
    pub async fn start() -> std::io::Result<Self> {
        let state: Shared = Arc::new(Mutex::new(BackendState::seeded()));
        let router = Router::new()
            .route("/products", get(list_products))
            .route("/products/categories", get(list_categories))
            .route("/products/category/{name}", get(list_in_category))
            .route("/products/{id}", get(get_product))
            .route("/auth/login", post(login))
            .route("/auth/register", post(register))
            .route("/carts", get(list_orders).post(create_order))
            .route("/carts/user/{id}", get(list_user_orders))
            .route("/carts/{id}", get(get_order))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let base_url = Url::parse(&format!("http://{addr}"))
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!(error = %e, "Mock backend stopped");
            }
        });

        Ok(Self { base_url, state })
    }

    /// Base URL to point the storefront at.
    #[must_use]
    pub fn base_url(&self) -> Url {
        self.base_url.clone()
    }

    /// Invalidate every issued token, as if they all expired.
    pub fn expire_tokens(&self) {
        self.lock().tokens.clear();
    }

    /// Orders the backend has accepted so far.
    #[must_use]
    pub fn orders(&self) -> Vec<Value> {
        self.lock().orders.clone()
    }

    /// Requests served so far.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.lock().requests
    }

    fn lock(&self) -> MutexGuard<'_, BackendState> {
        lock(&self.state)
    }
}

fn lock(state: &Shared) -> MutexGuard<'_, BackendState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn message(status: StatusCode, text: &str) -> Response {
    (status, Json(json!({ "message": text }))).into_response()
}

#[derive(Deserialize)]
struct Listing {
    limit: Option<usize>,
    sort: Option<String>,
}

fn apply_listing(mut products: Vec<Value>, listing: &Listing) -> Vec<Value> {
    if listing.sort.as_deref() == Some("desc") {
        products.reverse();
    }
    if let Some(limit) = listing.limit {
        products.truncate(limit);
    }
    products
}

async fn list_products(State(state): State<Shared>, Query(listing): Query<Listing>) -> Response {
    let mut state = lock(&state);
    state.requests += 1;
    Json(apply_listing(state.products.clone(), &listing)).into_response()
}

async fn list_categories(State(state): State<Shared>) -> Response {
    let mut state = lock(&state);
    state.requests += 1;
    let mut categories: Vec<&str> = state
        .products
        .iter()
        .filter_map(|p| p["category"].as_str())
        .collect();
    categories.dedup();
    Json(categories).into_response()
}

async fn list_in_category(
    State(state): State<Shared>,
    Path(name): Path<String>,
    Query(listing): Query<Listing>,
) -> Response {
    let mut state = lock(&state);
    state.requests += 1;
    let products = state
        .products
        .iter()
        .filter(|p| p["category"] == name.as_str())
        .cloned()
        .collect();
    Json(apply_listing(products, &listing)).into_response()
}

async fn get_product(State(state): State<Shared>, Path(id): Path<u64>) -> Response {
    let mut state = lock(&state);
    state.requests += 1;
    // Unknown products answer 200 with an empty body, like the real backend.
    state
        .products
        .iter()
        .find(|p| p["id"] == id)
        .map_or_else(|| String::new().into_response(), |p| Json(p.clone()).into_response())
}

#[derive(Deserialize)]
struct Credentials {
    name: Option<String>,
    email: String,
    password: String,
}

async fn login(State(state): State<Shared>, Json(body): Json<Credentials>) -> Response {
    let mut state = lock(&state);
    state.requests += 1;
    let Some(account) = state
        .accounts
        .iter()
        .find(|a| a.email == body.email && a.password == body.password)
    else {
        return message(StatusCode::UNAUTHORIZED, "Invalid credentials");
    };
    let (id, user) = (account.id, account.to_json());
    let token = state.issue_token(id);
    Json(json!({ "data": { "token": token, "user": user } })).into_response()
}

async fn register(State(state): State<Shared>, Json(body): Json<Credentials>) -> Response {
    let mut state = lock(&state);
    state.requests += 1;
    if state.accounts.iter().any(|a| a.email == body.email) {
        return message(StatusCode::BAD_REQUEST, "Email already registered");
    }
    let account = Account {
        id: state.accounts.len() as u64 + 1,
        name: body.name.unwrap_or_default(),
        email: body.email,
        password: body.password,
        role: "customer",
    };
    let (id, user) = (account.id, account.to_json());
    state.accounts.push(account);
    let token = state.issue_token(id);
    Json(json!({ "data": { "token": token, "user": user } })).into_response()
}

async fn list_orders(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut state = lock(&state);
    state.requests += 1;
    match state.caller(&headers) {
        None => message(StatusCode::UNAUTHORIZED, "jwt expired"),
        Some(account) if account.role != "ADMIN" => message(StatusCode::FORBIDDEN, "Forbidden"),
        Some(_) => Json(state.orders.clone()).into_response(),
    }
}

async fn list_user_orders(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(user_id): Path<u64>,
) -> Response {
    let mut state = lock(&state);
    state.requests += 1;
    if state.caller(&headers).is_none() {
        return message(StatusCode::UNAUTHORIZED, "jwt expired");
    }
    let orders: Vec<Value> = state
        .orders
        .iter()
        .filter(|o| o["userId"] == user_id)
        .cloned()
        .collect();
    Json(orders).into_response()
}

async fn get_order(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Response {
    let mut state = lock(&state);
    state.requests += 1;
    if state.caller(&headers).is_none() {
        return message(StatusCode::UNAUTHORIZED, "jwt expired");
    }
    state
        .orders
        .iter()
        .find(|o| o["id"] == id)
        .map_or_else(
            || message(StatusCode::NOT_FOUND, "Order not found"),
            |o| Json(o.clone()).into_response(),
        )
}

async fn create_order(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Response {
    let mut state = lock(&state);
    state.requests += 1;
    if state.caller(&headers).is_none() {
        return message(StatusCode::UNAUTHORIZED, "jwt expired");
    }
    body["id"] = json!(state.orders.len() + 1);
    state.orders.push(body.clone());
    Json(body).into_response()
}

// =============================================================================
// Test Context
// =============================================================================

/// A running backend plus a storage directory that outlives storefronts.
pub struct TestContext {
    pub backend: MockBackend,
    dir: TempDir,
}

impl TestContext {
    /// Start a backend and create an empty storage directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot bind or the directory cannot
    /// be created.
    pub async fn new() -> std::io::Result<Self> {
        Ok(Self {
            backend: MockBackend::start().await?,
            dir: TempDir::new()?,
        })
    }

    /// Configuration pointing at the backend and the shared storage file.
    #[must_use]
    pub fn config(&self) -> StorefrontConfig {
        StorefrontConfig {
            api: ApiConfig::new(self.backend.base_url()),
            storage_path: self.dir.path().join("storage.json"),
            quantity_ceiling: 99,
        }
    }

    /// A fresh storefront over the shared storage file, as a new process
    /// would see it.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be opened.
    pub fn open(&self) -> savat_storefront::Result<Storefront> {
        Storefront::init(self.config())
    }
}
