//! The storefront context shared by front ends.
//!
//! [`Storefront`] owns one storage backend and hands it to both the cart store
//! and the session holder, so the pair is hydrated together on
//! [`init`](Storefront::init) and torn down together on
//! [`dispose`](Storefront::dispose). Front ends go through it rather than
//! reaching for the stores directly; it is where quantity limits are checked
//! and where a rejected credential ends the session.

use std::collections::HashMap;
use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};

use savat_core::{Email, OrderId, ProductId, UserId};

use crate::api::types::NewOrder;
use crate::api::{ApiClient, ApiError, SortOrder};
use crate::cart::{CartStore, QuantityLimit};
use crate::config::StorefrontConfig;
use crate::error::{AppError, Result};
use crate::models::{DashboardStats, Order, OrderLine, PricedOrder, Product, User};
use crate::session::{SessionError, SessionHolder};
use crate::storage::{FileStorage, LocalStorage};

/// Shortest password accepted on login or registration.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Cart, session and backend access for one user of the store.
pub struct Storefront {
    config: StorefrontConfig,
    api: ApiClient,
    cart: CartStore,
    session: SessionHolder,
    limit: QuantityLimit,
}

impl std::fmt::Debug for Storefront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storefront")
            .field("cart", &self.cart)
            .field("session", &self.session)
            .field("limit", &self.limit)
            .finish_non_exhaustive()
    }
}

impl Storefront {
    /// Open file-backed storage at `config.storage_path` and hydrate from it.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Storage` if the storage file cannot be opened, or
    /// `AppError::Api` if the HTTP client cannot be built.
    pub fn init(config: StorefrontConfig) -> Result<Self> {
        let storage = FileStorage::open(&config.storage_path)?;
        Self::with_storage(config, Arc::new(storage))
    }

    /// Hydrate from an already-open storage backend.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Api` if the HTTP client cannot be built.
    pub fn with_storage(config: StorefrontConfig, storage: Arc<dyn LocalStorage>) -> Result<Self> {
        let api = ApiClient::new(&config.api)?;
        let cart = CartStore::init(Arc::clone(&storage));
        let session = SessionHolder::init(storage);
        let limit = QuantityLimit::new(config.quantity_ceiling);

        tracing::info!(
            api = %api.base_url(),
            cart_lines = cart.items().len(),
            signed_in = session.is_authenticated(),
            "Storefront ready"
        );

        Ok(Self {
            config,
            api,
            cart,
            session,
            limit,
        })
    }

    /// Shut down, logging the state that remains persisted.
    pub fn dispose(self) {
        let signed_in = self.session.dispose().is_some();
        let lines = self.cart.dispose();
        tracing::debug!(cart_lines = lines.len(), signed_in, "Storefront disposed");
    }

    #[must_use]
    pub const fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    #[must_use]
    pub const fn cart(&self) -> &CartStore {
        &self.cart
    }

    #[must_use]
    pub const fn session(&self) -> &SessionHolder {
        &self.session
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// List products, optionally within one category.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Api` if the backend request fails.
    pub async fn products(
        &self,
        limit: Option<u32>,
        sort: Option<SortOrder>,
        category: Option<&str>,
    ) -> Result<Vec<Product>> {
        let products = match category {
            Some(category) => {
                self.api
                    .list_products_in_category(category, limit, sort)
                    .await?
            }
            None => self.api.list_products(limit, sort).await?,
        };
        Ok(products)
    }

    /// Fetch one product.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for unknown IDs, or `AppError::Api`.
    pub async fn product(&self, id: ProductId) -> Result<Product> {
        self.api.get_product(id).await.map_err(|e| match e {
            ApiError::NotFound(_) => AppError::NotFound(format!("Product {id}")),
            other => AppError::Api(other),
        })
    }

    /// List category names.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Api` if the backend request fails.
    pub async fn categories(&self) -> Result<Vec<String>> {
        Ok(self.api.list_categories().await?)
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Sign in with email and password.
    ///
    /// On failure the session keeps its previous state and the failure message
    /// is recorded as the session error.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidEmail` or `AppError::BadRequest` for input the
    /// backend would refuse, or `AppError::Api` (typically `Unauthorized`).
    pub async fn login(&mut self, email: &str, password: &SecretString) -> Result<User> {
        let result = self.try_login(email, password).await;
        self.settle_auth(result)
    }

    /// Create an account and sign in with it.
    ///
    /// # Errors
    ///
    /// As for [`login`](Self::login), plus `AppError::BadRequest` for an empty
    /// name.
    pub async fn register(
        &mut self,
        name: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<User> {
        let result = self.try_register(name, email, password).await;
        self.settle_auth(result)
    }

    /// Sign out and forget any recorded error. The cart is left as it is.
    pub fn logout(&mut self) {
        self.session.clear_session();
        self.session.clear_error();
    }

    async fn try_login(&self, email: &str, password: &SecretString) -> Result<(User, SecretString)> {
        let email = Email::parse(email)?;
        check_password(password)?;
        Ok(self.api.login(email.as_str(), password).await?)
    }

    async fn try_register(
        &self,
        name: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<(User, SecretString)> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::BadRequest("name is required".to_string()));
        }
        let email = Email::parse(email)?;
        check_password(password)?;
        Ok(self.api.register(name, email.as_str(), password).await?)
    }

    fn settle_auth(&mut self, result: Result<(User, SecretString)>) -> Result<User> {
        match result {
            Ok((user, token)) => {
                self.session.set_session(user.clone(), token);
                Ok(user)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Sign-in failed");
                self.session.set_error(e.user_message());
                Err(e)
            }
        }
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Add `quantity` units of a product, fetching its snapshot first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Quantity` when the line would fall outside the
    /// allowed range (the cart is left untouched), `AppError::NotFound` for
    /// unknown products, or `AppError::Api`.
    pub async fn add_to_cart(&mut self, product_id: ProductId, quantity: u32) -> Result<()> {
        let existing = self.cart.quantity_of(product_id);
        self.limit.check_add(existing, quantity)?;

        let product = self.product(product_id).await?;
        self.cart.add_item(product, quantity);
        tracing::info!(%product_id, quantity, "Added to cart");
        Ok(())
    }

    /// Set the quantity of a line already in the cart. Zero removes it.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the product is not in the cart, or
    /// `AppError::Quantity` for a negative or over-ceiling quantity.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: i64) -> Result<()> {
        if self.cart.get(product_id).is_none() {
            return Err(AppError::NotFound(format!("Product {product_id} in cart")));
        }
        if quantity == 0 {
            self.cart.remove_item(product_id);
            return Ok(());
        }

        let quantity = self.limit.check_set(quantity)?;
        self.cart.update_quantity(product_id, i64::from(quantity));
        Ok(())
    }

    /// Remove a line. Absent lines are ignored.
    pub fn remove_from_cart(&mut self, product_id: ProductId) {
        self.cart.remove_item(product_id);
    }

    /// Empty the cart.
    pub fn clear_cart(&mut self) {
        self.cart.clear();
    }

    /// Place an order for the cart contents and empty the cart.
    ///
    /// The cart is only cleared once the backend has accepted the order.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Session` when signed out, `AppError::BadRequest` for
    /// an empty cart, or `AppError::Api` if the order is refused.
    pub async fn checkout(&mut self) -> Result<Order> {
        let (user_id, token) = self.credentials()?;
        if self.cart.items().is_empty() {
            return Err(AppError::BadRequest("cart is empty".to_string()));
        }

        let new_order = NewOrder {
            user_id,
            date: chrono::Utc::now(),
            products: self
                .cart
                .items()
                .iter()
                .map(|line| OrderLine {
                    product_id: line.product_id,
                    quantity: line.quantity,
                })
                .collect(),
        };

        let result = self.api.create_order(&new_order, &token).await;
        let order = self.authorized(result)?;
        self.cart.clear();
        tracing::info!(order_id = %order.id, units = order.unit_count(), "Order placed");
        Ok(order)
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Orders placed by the signed-in user, with product details.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Session` when signed out, or `AppError::Api`.
    pub async fn my_orders(&mut self) -> Result<Vec<PricedOrder>> {
        let (user_id, token) = self.credentials()?;
        let result = self.api.list_user_orders(user_id, &token).await;
        let orders = self.authorized(result)?;
        Ok(self.price_orders(orders).await)
    }

    /// Every order in the store. Administrators only.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Session` unless signed in as an administrator, or
    /// `AppError::Api`.
    pub async fn all_orders(&mut self) -> Result<Vec<PricedOrder>> {
        let token = self.admin_token()?;
        let result = self.api.list_orders(&token).await;
        let orders = self.authorized(result)?;
        Ok(self.price_orders(orders).await)
    }

    /// One order with product details.
    ///
    /// Customers may only read their own orders.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Session` when signed out or reading someone else's
    /// order, `AppError::NotFound` for unknown IDs, or `AppError::Api`.
    pub async fn order(&mut self, id: OrderId) -> Result<PricedOrder> {
        let (user_id, token) = self.credentials()?;
        let result = self.api.get_order(id, &token).await;
        let order = match self.authorized(result) {
            Err(AppError::Api(ApiError::NotFound(_))) => {
                return Err(AppError::NotFound(format!("Order {id}")));
            }
            other => other?,
        };

        let is_admin = self.session.user().is_some_and(User::is_admin);
        if order.user_id != user_id && !is_admin {
            return Err(SessionError::Forbidden.into());
        }

        let mut priced = self.price_orders(vec![order]).await;
        priced
            .pop()
            .ok_or_else(|| AppError::NotFound(format!("Order {id}")))
    }

    /// Store-wide figures. Administrators only.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Session` unless signed in as an administrator, or
    /// `AppError::Api`.
    pub async fn dashboard(&mut self) -> Result<DashboardStats> {
        let token = self.admin_token()?;
        let result = self.api.list_orders(&token).await;
        let orders = self.authorized(result)?;
        let products = self.api.list_products(None, None).await?;
        let categories = self.api.list_categories().await?;

        Ok(DashboardStats::compute(orders, &products, &categories))
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn credentials(&self) -> Result<(UserId, SecretString)> {
        let user = self.session.require_user()?;
        let token = self.bearer()?;
        Ok((user.id, token))
    }

    fn admin_token(&self) -> Result<SecretString> {
        self.session.require_admin()?;
        self.bearer()
    }

    fn bearer(&self) -> Result<SecretString> {
        self.session
            .bearer_token()
            .map(|token| SecretString::from(token.expose_secret().to_owned()))
            .ok_or_else(|| SessionError::NotSignedIn.into())
    }

    /// Pass through the result of an authorized call, ending the session if
    /// the backend rejected the credential.
    fn authorized<T>(&mut self, result: std::result::Result<T, ApiError>) -> Result<T> {
        result.map_err(|e| {
            if e.is_unauthorized() {
                self.session.handle_unauthorized();
            }
            AppError::Api(e)
        })
    }

    /// Resolve every product the orders mention. Products that fail to load
    /// are left unresolved.
    async fn price_orders(&self, orders: Vec<Order>) -> Vec<PricedOrder> {
        let mut catalog: HashMap<ProductId, Product> = HashMap::new();
        for line in orders.iter().flat_map(|order| &order.products) {
            if catalog.contains_key(&line.product_id) {
                continue;
            }
            match self.api.get_product(line.product_id).await {
                Ok(product) => {
                    catalog.insert(line.product_id, product);
                }
                Err(e) => {
                    tracing::debug!(product_id = %line.product_id, error = %e, "Product lookup failed");
                }
            }
        }

        orders
            .into_iter()
            .map(|order| PricedOrder::new(order, |id| catalog.get(&id).cloned()))
            .collect()
    }
}

fn check_password(password: &SecretString) -> Result<()> {
    if password.expose_secret().chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}
