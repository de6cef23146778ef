//! Per-line quantity ceiling.
//!
//! The reducer never caps quantities. Front ends check requests against a
//! [`QuantityLimit`] first and show the error instead of mutating the cart.
//! The cap is a fixed ceiling per line; product stock is not consulted.

use thiserror::Error;

/// Units allowed on a single cart line unless configured otherwise.
pub const DEFAULT_QUANTITY_CEILING: u32 = 99;

/// Why a requested quantity was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QuantityError {
    /// Quantity must be at least one.
    #[error("quantity must be at least 1")]
    BelowMinimum,

    /// The line would exceed the ceiling.
    #[error("maximum quantity is {ceiling} (requested {requested})")]
    AboveCeiling {
        /// Configured ceiling.
        ceiling: u32,
        /// Resulting quantity that was refused.
        requested: u64,
    },
}

/// Fixed upper bound on units per cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantityLimit {
    ceiling: u32,
}

impl Default for QuantityLimit {
    fn default() -> Self {
        Self::new(DEFAULT_QUANTITY_CEILING)
    }
}

impl QuantityLimit {
    /// Create a limit. A ceiling of zero is raised to one.
    #[must_use]
    pub const fn new(ceiling: u32) -> Self {
        Self {
            ceiling: if ceiling == 0 { 1 } else { ceiling },
        }
    }

    /// The configured ceiling.
    #[must_use]
    pub const fn ceiling(&self) -> u32 {
        self.ceiling
    }

    /// Validate adding `added` units to a line that already holds `existing`.
    ///
    /// # Errors
    ///
    /// `BelowMinimum` if `added` is zero, `AboveCeiling` if the resulting line
    /// would exceed the ceiling.
    pub fn check_add(&self, existing: u32, added: u32) -> Result<u32, QuantityError> {
        if added == 0 {
            return Err(QuantityError::BelowMinimum);
        }
        self.check_total(u64::from(existing) + u64::from(added))?;
        Ok(added)
    }

    /// Validate setting a line to exactly `quantity` units.
    ///
    /// # Errors
    ///
    /// `BelowMinimum` for values below one, `AboveCeiling` above the ceiling.
    pub fn check_set(&self, quantity: i64) -> Result<u32, QuantityError> {
        let Ok(quantity) = u64::try_from(quantity) else {
            return Err(QuantityError::BelowMinimum);
        };
        if quantity == 0 {
            return Err(QuantityError::BelowMinimum);
        }
        self.check_total(quantity)
    }

    fn check_total(&self, total: u64) -> Result<u32, QuantityError> {
        if total > u64::from(self.ceiling) {
            return Err(QuantityError::AboveCeiling {
                ceiling: self.ceiling,
                requested: total,
            });
        }
        u32::try_from(total).map_err(|_| QuantityError::AboveCeiling {
            ceiling: self.ceiling,
            requested: total,
        })
    }
}
