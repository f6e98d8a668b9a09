//! Cart store strategies
//!
//! [`CartStore`] is the persistence protocol the engine drives. Two
//! strategies implement it over very different primitives:
//!
//! - [`TransactionalStore`] runs every operation inside one locked
//!   transaction over a [`RelationalBackend`].
//! - [`ConditionalStore`] composes single-record conditional puts and
//!   unconditional batch writes over a [`SingleTableBackend`].
//!
//! Their guarantees differ and are declared through [`StoreCapabilities`].

use async_trait::async_trait;

use crate::{
    context::OpContext,
    errors::CartError,
    ids::{CartId, CustomerId},
    models::{Cart, CreatedCart, ItemUpdate},
};

pub mod records;
mod relational;
mod single_table;

pub use relational::{RelationalBackend, RelationalTransaction, TransactionalStore};
pub use single_table::{ConditionalStore, SingleTableBackend};

/// Guarantees a store strategy provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreCapabilities {
    /// An item batch is applied entirely or not at all.
    pub supports_atomic_batch: bool,

    /// A customer can own at most one active cart.
    ///
    /// Racing first creates for a customer are not guaranteed to see
    /// [`CartError::DuplicateActiveCart`]: a store may abort the losers with
    /// a [`StoreError`](crate::errors::StoreError) such as a deadlock or
    /// lock timeout instead. Either way at most one active cart is stored.
    pub enforces_single_active_cart: bool,

    /// Cart and product existence are checked before items are written.
    pub validates_references: bool,
}

/// Backend-specific persistence protocol.
///
/// Callers are expected to have applied the consistency policy already:
/// customers are non-zero and item batches are duplicate-free with positive
/// quantities.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Guarantees of this strategy.
    fn capabilities(&self) -> StoreCapabilities;

    /// Parse an external cart identifier into this store's identity form.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidInput`] when `raw` is not a valid identity.
    fn parse_cart_id(&self, raw: &str) -> Result<CartId, CartError>;

    /// Create an active cart for `customer`.
    async fn create_cart(
        &self,
        ctx: &OpContext,
        customer: CustomerId,
    ) -> Result<CreatedCart, CartError>;

    /// Fetch a cart with all of its items.
    async fn get_cart(&self, ctx: &OpContext, cart: CartId) -> Result<Cart, CartError>;

    /// Insert or overwrite the quantities of `items` in `cart`.
    async fn upsert_items(
        &self,
        ctx: &OpContext,
        cart: CartId,
        items: &[ItemUpdate],
    ) -> Result<(), CartError>;

    /// Remove every cart and item.
    async fn purge(&self, ctx: &OpContext) -> Result<(), CartError>;
}
