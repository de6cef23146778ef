//! Shopping cart.
//!
//! The cart is split the same way every mutation is:
//!
//! - [`reducer`] - pure list and quantity math over `Vec<CartLineItem>`,
//!   reporting which persistence [`Effect`] the change needs
//! - [`CartStore`] - owns the items, applies the reducer, then performs the
//!   effect against [`LocalStorage`](crate::storage::LocalStorage)
//! - [`CartSummary`] - derived counts and totals, never stored
//! - [`QuantityLimit`] - the per-line ceiling callers check before mutating
//!
//! # Invariants
//!
//! Every stored line has `quantity >= 1` and at most one line exists per
//! product. Insertion order is kept for display only.

mod limit;
pub mod reducer;
mod store;
mod summary;

pub use limit::{DEFAULT_QUANTITY_CEILING, QuantityError, QuantityLimit};
pub use reducer::{CartAction, Effect};
pub use store::CartStore;
pub use summary::CartSummary;

use serde::{Deserialize, Serialize};

use savat_core::{Price, ProductId};

use crate::models::Product;

/// One entry in the cart: a product and the quantity requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    pub product_id: ProductId,
    /// Snapshot taken when the product was added; may be stale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<Product>,
    pub quantity: u32,
}

impl CartLineItem {
    /// Create a line from a product snapshot.
    #[must_use]
    pub fn new(product: Product, quantity: u32) -> Self {
        Self {
            product_id: product.id,
            product: Some(product),
            quantity,
        }
    }

    /// `price × quantity`, when a snapshot is present.
    #[must_use]
    pub fn line_total(&self) -> Option<Price> {
        self.product
            .as_ref()
            .map(|product| product.unit_price().times(self.quantity))
    }
}
