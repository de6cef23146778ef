//! Persisted cart store.

use std::sync::Arc;

use savat_core::ProductId;

use super::reducer::{self, CartAction, Effect};
use super::{CartLineItem, CartSummary};
use crate::models::Product;
use crate::storage::{LocalStorage, keys};

/// Single source of truth for the shopping cart.
///
/// Every mutation runs through the pure reducer and then writes the result to
/// storage under [`keys::CART`]. Mutations never fail: a storage error is
/// logged and the in-memory cart stays authoritative until the next write.
pub struct CartStore {
    items: Vec<CartLineItem>,
    storage: Arc<dyn LocalStorage>,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("items", &self.items)
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Create a store and hydrate it from `storage`.
    #[must_use]
    pub fn init(storage: Arc<dyn LocalStorage>) -> Self {
        let mut store = Self {
            items: Vec::new(),
            storage,
        };
        let persisted = store.read_persisted();
        store.load(persisted);
        tracing::debug!(lines = store.items.len(), "Cart hydrated");
        store
    }

    /// Tear the store down, handing back the final lines.
    #[must_use]
    pub fn dispose(self) -> Vec<CartLineItem> {
        tracing::debug!(lines = self.items.len(), "Cart store disposed");
        self.items
    }

    /// Current lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// The line for `product_id`, if any.
    #[must_use]
    pub fn get(&self, product_id: ProductId) -> Option<&CartLineItem> {
        self.items.iter().find(|line| line.product_id == product_id)
    }

    /// Quantity currently held for `product_id` (zero when absent).
    #[must_use]
    pub fn quantity_of(&self, product_id: ProductId) -> u32 {
        self.get(product_id).map_or(0, |line| line.quantity)
    }

    /// Derived counts and totals.
    #[must_use]
    pub fn summary(&self) -> CartSummary {
        CartSummary::of(&self.items)
    }

    /// Add `quantity` units of `product`, merging with an existing line.
    pub fn add_item(&mut self, product: Product, quantity: u32) {
        self.dispatch(CartAction::AddItem { product, quantity });
    }

    /// Remove the line for `product_id`. Absent lines are ignored.
    pub fn remove_item(&mut self, product_id: ProductId) {
        self.dispatch(CartAction::RemoveItem { product_id });
    }

    /// Set the quantity of an existing line. Values below 1 are ignored.
    pub fn update_quantity(&mut self, product_id: ProductId, quantity: i64) {
        self.dispatch(CartAction::UpdateQuantity {
            product_id,
            quantity,
        });
    }

    /// Empty the cart and delete the persisted entry.
    pub fn clear(&mut self) {
        self.dispatch(CartAction::Clear);
    }

    /// Replace all lines without writing them back.
    pub fn load(&mut self, items: Vec<CartLineItem>) {
        self.dispatch(CartAction::Load { items });
    }

    fn dispatch(&mut self, action: CartAction) {
        let effect = reducer::reduce(&mut self.items, action);
        self.apply(effect);
    }

    fn apply(&self, effect: Effect) {
        let result = match effect {
            Effect::None => return,
            Effect::Write => match serde_json::to_string(&self.items) {
                Ok(json) => self.storage.set_item(keys::CART, &json),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize cart");
                    return;
                }
            },
            Effect::Purge => self.storage.remove_item(keys::CART),
        };

        if let Err(e) = result {
            tracing::error!(error = %e, ?effect, "Failed to persist cart");
        }
    }

    /// Read the persisted lines, purging anything that does not parse.
    fn read_persisted(&self) -> Vec<CartLineItem> {
        let raw = match self.storage.get_item(keys::CART) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read persisted cart");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<CartLineItem>>(&raw) {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(error = %e, "Discarding corrupted persisted cart");
                if let Err(e) = self.storage.remove_item(keys::CART) {
                    tracing::error!(error = %e, "Failed to purge corrupted cart");
                }
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::storage::MemoryStorage;

    fn product(id: u64, price: i64) -> Product {
        Product {
            id: ProductId::new(id),
            title: format!("Product {id}"),
            price: Decimal::from(price),
            description: String::new(),
            category: String::new(),
            image: String::new(),
            rating: None,
            stock: Some(20),
        }
    }

    fn fresh() -> (Arc<MemoryStorage>, CartStore) {
        let storage = Arc::new(MemoryStorage::new());
        let store = CartStore::init(storage.clone());
        (storage, store)
    }

    #[test]
    fn test_walkthrough_totals() {
        let (_, mut cart) = fresh();
        let id = ProductId::new(1);

        cart.add_item(product(1, 10), 2);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.quantity_of(id), 2);
        assert_eq!(cart.summary().total.to_string(), "$20.00");

        cart.add_item(product(1, 10), 3);
        assert_eq!(cart.quantity_of(id), 5);
        assert_eq!(cart.summary().total.to_string(), "$50.00");

        cart.update_quantity(id, 1);
        assert_eq!(cart.quantity_of(id), 1);
        assert_eq!(cart.summary().total.to_string(), "$10.00");

        cart.remove_item(id);
        assert!(cart.items().is_empty());
        assert_eq!(cart.summary().total.amount, Decimal::ZERO);
    }

    #[test]
    fn test_every_mutation_persists() {
        let (storage, mut cart) = fresh();
        assert!(!storage.contains(keys::CART));

        cart.add_item(product(4, 3), 2);
        let raw = storage.get_item(keys::CART).unwrap().unwrap();
        let persisted: Vec<CartLineItem> = serde_json::from_str(&raw).unwrap();
        assert_eq!(persisted, cart.items());

        cart.remove_item(ProductId::new(4));
        assert_eq!(storage.get_item(keys::CART).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_rejected_update_does_not_write() {
        let (storage, mut cart) = fresh();
        cart.add_item(product(1, 10), 2);
        storage.remove_item(keys::CART).unwrap();

        cart.update_quantity(ProductId::new(1), 0);
        cart.update_quantity(ProductId::new(1), -1);
        assert_eq!(cart.quantity_of(ProductId::new(1)), 2);
        assert!(!storage.contains(keys::CART));
    }

    #[test]
    fn test_clear_removes_entry() {
        let (storage, mut cart) = fresh();
        cart.add_item(product(1, 10), 1);
        cart.clear();
        assert!(cart.items().is_empty());
        assert!(!storage.contains(keys::CART));
    }

    #[test]
    fn test_clear_then_reload_is_empty() {
        let (storage, mut cart) = fresh();
        cart.add_item(product(1, 10), 1);
        cart.clear();
        cart.load(Vec::new());
        assert!(!storage.contains(keys::CART));

        let rehydrated = CartStore::init(storage.clone());
        assert!(rehydrated.items().is_empty());
        assert!(!storage.contains(keys::CART));
    }

    #[test]
    fn test_reload_round_trip() {
        let (storage, mut cart) = fresh();
        cart.add_item(product(1, 10), 2);
        cart.add_item(product(2, 7), 1);
        let before = cart.dispose();

        let reloaded = CartStore::init(storage);
        let pairs = |items: &[CartLineItem]| {
            items
                .iter()
                .map(|l| (l.product_id, l.quantity))
                .collect::<Vec<_>>()
        };
        assert_eq!(pairs(reloaded.items()), pairs(&before));
    }

    #[test]
    fn test_load_does_not_write() {
        let (storage, mut cart) = fresh();
        cart.load(vec![CartLineItem::new(product(3, 1), 2)]);
        assert_eq!(cart.quantity_of(ProductId::new(3)), 2);
        assert!(!storage.contains(keys::CART));
    }

    #[test]
    fn test_corrupted_entry_is_purged() {
        let storage = Arc::new(MemoryStorage::with_entries([(keys::CART, "{oops")]));
        let cart = CartStore::init(storage.clone());
        assert!(cart.items().is_empty());
        assert!(!storage.contains(keys::CART));
    }

    #[test]
    fn test_negative_quantity_entry_is_purged() {
        let storage = Arc::new(MemoryStorage::with_entries([(
            keys::CART,
            r#"[{"productId": 1, "quantity": -2}]"#,
        )]));
        let cart = CartStore::init(storage.clone());
        assert!(cart.items().is_empty());
        assert!(!storage.contains(keys::CART));
    }

    #[test]
    fn test_hydration_normalizes_duplicates() {
        let storage = Arc::new(MemoryStorage::with_entries([(
            keys::CART,
            r#"[{"productId": 1, "quantity": 2}, {"productId": 1, "quantity": 1}, {"productId": 2, "quantity": 0}]"#,
        )]));
        let cart = CartStore::init(storage);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 3);
        assert!(cart.items()[0].product.is_none());
    }
}
