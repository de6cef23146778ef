//! REST client for the storefront backend.
//!
//! # Architecture
//!
//! - Plain JSON over HTTP with `reqwest`
//! - The backend is the source of truth for products, orders and accounts;
//!   nothing here is persisted
//! - Product lookups are cached in memory via `moka` (TTL from config)
//!
//! # Example
//!
//! ```rust,ignore
//! use savat_storefront::api::{ApiClient, SortOrder};
//!
//! let client = ApiClient::new(&config.api)?;
//! let products = client.list_products(Some(12), Some(SortOrder::Desc)).await?;
//! let product = client.get_product(products[0].id).await?;
//! ```

mod cache;
pub mod types;

use std::sync::Arc;

use moka::future::Cache;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::instrument;
use url::Url;

use savat_core::{OrderId, ProductId, UserId};

use crate::config::ApiConfig;
use crate::models::{Order, Product, User};

use cache::{CacheKey, CacheValue};
use types::{AuthPayload, Envelope, ErrorBody, LoginRequest, NewOrder, RegisterRequest};

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Credential missing, expired or rejected (HTTP 401).
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Any other non-success status.
    #[error("HTTP {status}: {message}")]
    Status {
        /// Status code returned.
        status: u16,
        /// Backend message, or a prefix of the body.
        message: String,
    },
}

impl ApiError {
    /// Whether the backend rejected the credential.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }
}

/// Sort direction accepted by listing endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// Query-string value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(format!("invalid sort order: {s} (expected asc or desc)")),
        }
    }
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the backend REST API.
///
/// Cheaply cloneable; clones share the connection pool and cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<CacheKey, CacheValue>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("savat/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let cache = Cache::builder()
            .max_capacity(config.cache_capacity)
            .time_to_live(config.cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.clone(),
                cache,
            }),
        })
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// List products.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the body does not parse.
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        limit: Option<u32>,
        sort: Option<SortOrder>,
    ) -> Result<Vec<Product>, ApiError> {
        let key = CacheKey::Products { limit, sort };
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&key).await {
            tracing::debug!("Cache hit for product list");
            return Ok(products);
        }

        let url = self.url("products", &listing_query(limit, sort))?;
        let products: Vec<Product> = self.get(url, None).await?;
        self.inner
            .cache
            .insert(key, CacheValue::Products(products.clone()))
            .await;
        Ok(products)
    }

    /// Fetch one product.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for unknown IDs (the backend may answer
    /// with an empty body instead of a 404), or any other `ApiError`.
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, ApiError> {
        let key = CacheKey::Product(id);
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&key).await {
            tracing::debug!(%id, "Cache hit for product");
            return Ok(*product);
        }

        let url = self.url(&format!("products/{id}"), &[])?;
        let product: Option<Product> = self.get(url, None).await?;
        let product = product.ok_or_else(|| ApiError::NotFound(format!("product {id}")))?;
        self.inner
            .cache
            .insert(key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Ok(product)
    }

    /// List category names.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the body does not parse.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<String>, ApiError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            return Ok(categories);
        }

        let url = self.url("products/categories", &[])?;
        let categories: Vec<String> = self.get(url, None).await?;
        self.inner
            .cache
            .insert(
                CacheKey::Categories,
                CacheValue::Categories(categories.clone()),
            )
            .await;
        Ok(categories)
    }

    /// List products in one category.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the body does not parse.
    #[instrument(skip(self))]
    pub async fn list_products_in_category(
        &self,
        category: &str,
        limit: Option<u32>,
        sort: Option<SortOrder>,
    ) -> Result<Vec<Product>, ApiError> {
        let key = CacheKey::Category {
            name: category.to_string(),
            limit,
            sort,
        };
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&key).await {
            return Ok(products);
        }

        let mut url = self.url("products/category/", &listing_query(limit, sort))?;
        url.path_segments_mut()
            .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .push(category);
        let products: Vec<Product> = self.get(url, None).await?;
        self.inner
            .cache
            .insert(key, CacheValue::Products(products.clone()))
            .await;
        Ok(products)
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// List every order (administrators).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` if the credential is rejected, or any
    /// other `ApiError`.
    #[instrument(skip(self, token))]
    pub async fn list_orders(&self, token: &SecretString) -> Result<Vec<Order>, ApiError> {
        let url = self.url("carts", &[])?;
        self.get(url, Some(token)).await
    }

    /// Fetch one order.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for unknown IDs, or any other `ApiError`.
    #[instrument(skip(self, token))]
    pub async fn get_order(&self, id: OrderId, token: &SecretString) -> Result<Order, ApiError> {
        let url = self.url(&format!("carts/{id}"), &[])?;
        let order: Option<Order> = self.get(url, Some(token)).await?;
        order.ok_or_else(|| ApiError::NotFound(format!("order {id}")))
    }

    /// List the orders placed by one user.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the body does not parse.
    #[instrument(skip(self, token))]
    pub async fn list_user_orders(
        &self,
        user_id: UserId,
        token: &SecretString,
    ) -> Result<Vec<Order>, ApiError> {
        let url = self.url(&format!("carts/user/{user_id}"), &[])?;
        self.get(url, Some(token)).await
    }

    /// Place an order.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the backend refuses the order.
    #[instrument(skip(self, order, token), fields(user_id = %order.user_id, lines = order.products.len()))]
    pub async fn create_order(
        &self,
        order: &NewOrder,
        token: &SecretString,
    ) -> Result<Order, ApiError> {
        let url = self.url("carts", &[])?;
        let request = self
            .inner
            .client
            .post(url)
            .bearer_auth(token.expose_secret())
            .json(order);
        self.send(request).await
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Exchange credentials for a session.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` for bad credentials, or any other
    /// `ApiError`.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<(User, SecretString), ApiError> {
        let url = self.url("auth/login", &[])?;
        let body = LoginRequest {
            email,
            password: password.expose_secret(),
        };
        let request = self.inner.client.post(url).json(&body);
        let envelope: Envelope<AuthPayload> = self.send(request).await?;
        Ok(into_session(envelope.data))
    }

    /// Create an account and sign in.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` when the backend refuses the registration,
    /// or any other `ApiError`.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<(User, SecretString), ApiError> {
        let url = self.url("auth/register", &[])?;
        let body = RegisterRequest {
            name,
            email,
            password: password.expose_secret(),
        };
        let request = self.inner.client.post(url).json(&body);
        let envelope: Envelope<AuthPayload> = self.send(request).await?;
        Ok(into_session(envelope.data))
    }

    // =========================================================================
    // Plumbing
    // =========================================================================

    fn url(&self, path: &str, query: &[(&str, String)]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.join(path)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        url: Url,
        token: Option<&SecretString>,
    ) -> Result<T, ApiError> {
        let mut request = self.inner.client.get(url);
        if let Some(token) = token {
            request = request.bearer_auth(token.expose_secret());
        }
        self.send(request).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        let path = response.url().path().to_string();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        let body = response.text().await?;

        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized(
                error_message(&body).unwrap_or_else(|| "credential rejected".to_string()),
            ));
        }

        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(path));
        }

        if !status.is_success() {
            tracing::error!(
                status = %status,
                path = %path,
                body = %body.chars().take(500).collect::<String>(),
                "Backend returned non-success status"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: error_message(&body)
                    .unwrap_or_else(|| body.chars().take(200).collect()),
            });
        }

        // Unknown IDs come back as 200 with an empty body; read that as null.
        let body = if body.trim().is_empty() { "null" } else { body.as_str() };
        serde_json::from_str(body).map_err(|e| {
            tracing::error!(
                error = %e,
                path = %path,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse backend response"
            );
            ApiError::Parse(e)
        })
    }
}

fn listing_query(limit: Option<u32>, sort: Option<SortOrder>) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    if let Some(limit) = limit {
        query.push(("limit", limit.to_string()));
    }
    if let Some(sort) = sort {
        query.push(("sort", sort.as_str().to_string()));
    }
    query
}

fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .map(|e| e.message)
        .filter(|m| !m.trim().is_empty())
}

fn into_session(payload: AuthPayload) -> (User, SecretString) {
    (payload.user, SecretString::from(payload.token))
}
