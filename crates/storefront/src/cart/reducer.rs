//! Pure cart state transitions.
//!
//! [`reduce`] never touches storage. It mutates the item list and returns the
//! [`Effect`] the caller has to apply so the persisted copy stays in sync.

use savat_core::ProductId;

use super::CartLineItem;
use crate::models::Product;

/// A requested change to the cart.
#[derive(Debug, Clone, PartialEq)]
pub enum CartAction {
    /// Add `quantity` units of `product`, merging with an existing line.
    AddItem { product: Product, quantity: u32 },
    /// Drop the line for `product_id`, if any.
    RemoveItem { product_id: ProductId },
    /// Set the quantity of an existing line. Values below 1 are ignored.
    UpdateQuantity { product_id: ProductId, quantity: i64 },
    /// Empty the cart and forget the persisted copy.
    Clear,
    /// Replace the whole list, as done once at hydration.
    Load { items: Vec<CartLineItem> },
}

/// Persistence work required after a transition.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Nothing changed that needs writing.
    None,
    /// Serialize the list and write it.
    Write,
    /// Delete the persisted entry.
    Purge,
}

/// Apply `action` to `items`.
pub fn reduce(items: &mut Vec<CartLineItem>, action: CartAction) -> Effect {
    match action {
        CartAction::AddItem { product, quantity } => {
            if quantity == 0 {
                return Effect::None;
            }
            if let Some(line) = items.iter_mut().find(|line| line.product_id == product.id) {
                line.quantity = line.quantity.saturating_add(quantity);
                if line.product.is_none() {
                    line.product = Some(product);
                }
            } else {
                items.push(CartLineItem::new(product, quantity));
            }
            Effect::Write
        }
        CartAction::RemoveItem { product_id } => {
            items.retain(|line| line.product_id != product_id);
            Effect::Write
        }
        CartAction::UpdateQuantity {
            product_id,
            quantity,
        } => {
            if quantity < 1 {
                return Effect::None;
            }
            let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
            match items.iter_mut().find(|line| line.product_id == product_id) {
                Some(line) => {
                    line.quantity = quantity;
                    Effect::Write
                }
                None => Effect::None,
            }
        }
        CartAction::Clear => {
            items.clear();
            Effect::Purge
        }
        CartAction::Load { items: loaded } => {
            *items = normalize(loaded);
            Effect::None
        }
    }
}

/// Restore the invariants on a list that came from outside the reducer.
///
/// Zero-quantity lines are dropped and duplicate product lines are merged into
/// the first occurrence, quantities summed.
#[must_use]
pub fn normalize(items: Vec<CartLineItem>) -> Vec<CartLineItem> {
    let mut out: Vec<CartLineItem> = Vec::with_capacity(items.len());
    for item in items {
        if item.quantity == 0 {
            continue;
        }
        if let Some(existing) = out.iter_mut().find(|line| line.product_id == item.product_id) {
            existing.quantity = existing.quantity.saturating_add(item.quantity);
            if existing.product.is_none() {
                existing.product = item.product;
            }
        } else {
            out.push(item);
        }
    }
    out
}
