//! Conditional single-table strategy

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error};

use crate::{
    allocator::{IdentityAllocator, RandomTokens},
    context::OpContext,
    errors::{CartError, StoreError},
    ids::{CartId, CustomerId, ProductId},
    models::{Cart, CartStatus, CreatedCart, ItemUpdate},
    oracle::{ProductOracle, SyntheticCatalog},
    store::{
        CartStore, StoreCapabilities,
        records::{self, Item},
    },
};

/// Primitives of a single-table key-value store.
#[async_trait]
pub trait SingleTableBackend: Send + Sync {
    /// Write `item` only if no record with its primary key exists.
    ///
    /// Fails with [`StoreError::ConditionFailed`] when one does.
    async fn put_if_absent(&self, item: Item) -> Result<(), StoreError>;

    /// Every record whose partition key equals `partition`.
    async fn query_partition(&self, partition: &str) -> Result<Vec<Item>, StoreError>;

    /// Unconditionally write `items`.
    ///
    /// Not atomic: when this fails, any prefix of `items` may already be
    /// stored.
    async fn batch_put(&self, items: Vec<Item>) -> Result<(), StoreError>;

    /// Delete every record.
    async fn purge(&self) -> Result<(), StoreError>;
}

/// Strategy built from conditional single-record writes and unconditional
/// batch writes.
///
/// Cart identities are generated locally and never looked up by customer,
/// so a customer may own several active carts. Item batches are checked
/// against the product oracle only, not against the cart's existence, and a
/// failed batch may be partially applied.
#[derive(Debug, Clone)]
pub struct ConditionalStore<T> {
    table: T,
    oracle: Arc<dyn ProductOracle>,
    allocator: Arc<dyn IdentityAllocator>,
}

impl<T: SingleTableBackend> ConditionalStore<T> {
    /// Wrap a table handle with the synthetic catalog and random tokens.
    #[must_use]
    pub fn new(table: T) -> Self {
        Self {
            table,
            oracle: Arc::new(SyntheticCatalog),
            allocator: Arc::new(RandomTokens),
        }
    }

    /// Resolve product names through `oracle`.
    #[must_use]
    pub fn with_oracle(mut self, oracle: Arc<dyn ProductOracle>) -> Self {
        self.oracle = oracle;
        self
    }

    /// Allocate cart tokens with `allocator`.
    #[must_use]
    pub fn with_allocator(mut self, allocator: Arc<dyn IdentityAllocator>) -> Self {
        self.allocator = allocator;
        self
    }

    /// Underlying table.
    #[must_use]
    pub fn table(&self) -> &T {
        &self.table
    }
}

fn token(cart: CartId) -> Result<uuid::Uuid, CartError> {
    match cart {
        CartId::Token(token) => Ok(token),
        CartId::Sequential(_) => Err(CartError::invalid(format!(
            "cart {cart} is not a cart token"
        ))),
    }
}

#[async_trait]
impl<T: SingleTableBackend> CartStore for ConditionalStore<T> {
    fn capabilities(&self) -> StoreCapabilities {
        StoreCapabilities {
            supports_atomic_batch: false,
            enforces_single_active_cart: false,
            validates_references: false,
        }
    }

    fn parse_cart_id(&self, raw: &str) -> Result<CartId, CartError> {
        CartId::parse_token(raw).ok_or_else(|| CartError::invalid("invalid cart ID"))
    }

    async fn create_cart(
        &self,
        ctx: &OpContext,
        customer: CustomerId,
    ) -> Result<CreatedCart, CartError> {
        let cart = self.allocator.allocate();
        let record = records::cart_record(cart, customer, CartStatus::Active);

        if let Err(source) = ctx.guard(self.table.put_if_absent(record)).await {
            if matches!(source, StoreError::ConditionFailed(_)) {
                error!(cart = %cart, "cart id collision");
            }

            return Err(source.into());
        }

        debug!(cart = %cart, customer = %customer, "created cart");

        Ok(CreatedCart {
            id: CartId::Token(cart),
            status: CartStatus::Active,
        })
    }

    async fn get_cart(&self, ctx: &OpContext, cart: CartId) -> Result<Cart, CartError> {
        let partition = records::cart_partition(token(cart)?);
        let found = ctx.guard(self.table.query_partition(&partition)).await?;

        records::decode_cart(cart, &found)
    }

    async fn upsert_items(
        &self,
        ctx: &OpContext,
        cart: CartId,
        items: &[ItemUpdate],
    ) -> Result<(), CartError> {
        let key = token(cart)?;
        let products: Vec<ProductId> = items.iter().map(|item| item.product_id).collect();
        let names = ctx.guard(self.oracle.resolve(ctx, &products)).await?;

        let missing: Vec<ProductId> = products
            .iter()
            .copied()
            .filter(|product| !names.contains_key(product))
            .collect();

        if !missing.is_empty() {
            return Err(CartError::ProductNotFound(missing));
        }

        let batch: Vec<Item> = items
            .iter()
            .filter_map(|item| {
                names
                    .get(&item.product_id)
                    .map(|name| records::item_record(key, item, name))
            })
            .collect();

        ctx.guard(self.table.batch_put(batch)).await?;

        debug!(cart = %cart, items = items.len(), "wrote item batch");

        Ok(())
    }

    async fn purge(&self, ctx: &OpContext) -> Result<(), CartError> {
        ctx.guard(self.table.purge()).await?;

        Ok(())
    }
}
