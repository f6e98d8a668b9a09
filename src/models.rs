//! Cart Models

use std::{fmt, str::FromStr};

use thiserror::Error;

use crate::ids::{CartId, CustomerId, ProductId};

/// Cart lifecycle status.
///
/// Only [`CartStatus::Active`] is ever assigned by the engine; the remaining
/// states belong to downstream order processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CartStatus {
    /// Open for item changes.
    Active,

    /// Converted into an order.
    Ordered,

    /// Paid for.
    Paid,

    /// Handed to the carrier.
    Shipped,

    /// Delivered.
    Completed,

    /// Abandoned by the customer.
    Cancelled,

    /// Flagged by a consistency check.
    Invalid,
}

impl CartStatus {
    /// Stored string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Ordered => "ordered",
            Self::Paid => "paid",
            Self::Shipped => "shipped",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Invalid => "invalid",
        }
    }
}

impl fmt::Display for CartStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised status string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown cart status `{0}`")]
pub struct UnknownStatus(pub String);

impl FromStr for CartStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "active" => Ok(Self::Active),
            "ordered" => Ok(Self::Ordered),
            "paid" => Ok(Self::Paid),
            "shipped" => Ok(Self::Shipped),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            "invalid" => Ok(Self::Invalid),
            other => Err(UnknownStatus(other.to_owned())),
        }
    }
}

/// Cart Model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cart {
    /// Cart identity
    pub id: CartId,

    /// Owning customer
    pub customer_id: CustomerId,

    /// Lifecycle status
    pub status: CartStatus,

    /// Items, ordered by product id
    pub items: Vec<CartItem>,
}

/// Cart Item Model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItem {
    /// Referenced product
    pub product_id: ProductId,

    /// Display name resolved when the item was read or written
    pub product_name: String,

    /// Stored quantity, always positive
    pub quantity: u32,
}

/// A requested quantity change for one product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemUpdate {
    /// Product to set
    pub product_id: ProductId,

    /// New quantity; zero is a no-op
    pub quantity: u32,
}

impl ItemUpdate {
    /// Build an update entry.
    #[must_use]
    pub const fn new(product_id: ProductId, quantity: u32) -> Self {
        Self {
            product_id,
            quantity,
        }
    }
}

/// Result of creating a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreatedCart {
    /// Newly assigned identity
    pub id: CartId,

    /// Initial status, always active
    pub status: CartStatus,
}

/// Result of applying an item batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Target cart
    pub cart_id: CartId,

    /// Entries written after zero quantities were dropped
    pub applied: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_stored_form() {
        for status in [
            CartStatus::Active,
            CartStatus::Ordered,
            CartStatus::Paid,
            CartStatus::Shipped,
            CartStatus::Completed,
            CartStatus::Cancelled,
            CartStatus::Invalid,
        ] {
            assert_eq!(status.as_str().parse::<CartStatus>(), Ok(status));
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert_eq!(
            "archived".parse::<CartStatus>(),
            Err(UnknownStatus("archived".to_owned()))
        );
    }
}
