//! Transactional-relational strategy

use async_trait::async_trait;
use rustc_hash::FxHashSet;
use tracing::{debug, warn};

use crate::{
    context::OpContext,
    errors::{CartError, StoreError},
    ids::{CartId, CustomerId, ProductId},
    models::{Cart, CartStatus, CreatedCart, ItemUpdate},
    store::{CartStore, StoreCapabilities},
};

/// Connection-level primitives of a relational store.
#[async_trait]
pub trait RelationalBackend: Send + Sync {
    /// Transaction handle.
    type Tx: RelationalTransaction;

    /// Open a transaction.
    async fn begin(&self) -> Result<Self::Tx, StoreError>;

    /// Read a cart joined with its items and their product names, outside
    /// any transaction. `None` when no cart row exists.
    async fn fetch_cart(&self, cart: u64) -> Result<Option<Cart>, StoreError>;

    /// Delete every item row and cart row.
    async fn purge(&self) -> Result<(), StoreError>;
}

/// Statements run inside one transaction.
///
/// Every `lock_*` call takes exclusive row locks held until commit or
/// rollback. Dropping a transaction without committing rolls it back.
#[async_trait]
pub trait RelationalTransaction: Send {
    /// Lock the customer's active cart, returning its key if one exists.
    async fn lock_active_cart(&mut self, customer: CustomerId) -> Result<Option<u64>, StoreError>;

    /// Insert an active cart and return its generated key.
    async fn insert_cart(&mut self, customer: CustomerId) -> Result<u64, StoreError>;

    /// Lock a cart row, returning whether it exists.
    async fn lock_cart(&mut self, cart: u64) -> Result<bool, StoreError>;

    /// Lock the listed product rows and return the ids that exist.
    async fn lock_products(&mut self, products: &[ProductId]) -> Result<Vec<ProductId>, StoreError>;

    /// Insert an item or overwrite the quantity of the existing one.
    async fn upsert_item(&mut self, cart: u64, item: &ItemUpdate) -> Result<(), StoreError>;

    /// Make every write visible and release locks.
    async fn commit(self) -> Result<(), StoreError>;

    /// Discard every write and release locks.
    async fn rollback(self) -> Result<(), StoreError>;
}

/// Strategy that runs each operation in a single locked transaction.
///
/// Creation locks the customer's active cart before inserting, so two
/// concurrent creates for one customer cannot both succeed. When no active
/// cart exists yet, `InnoDB` only holds gap locks over the empty index range;
/// racing inserts then deadlock and the losers fail with
/// [`StoreError::Deadlock`] rather than [`CartError::DuplicateActiveCart`].
/// Item batches are all or nothing.
#[derive(Debug, Clone)]
pub struct TransactionalStore<B> {
    backend: B,
}

impl<B: RelationalBackend> TransactionalStore<B> {
    /// Wrap a shared backend handle.
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Underlying backend.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    async fn create_in(
        ctx: &OpContext,
        tx: &mut B::Tx,
        customer: CustomerId,
    ) -> Result<CreatedCart, CartError> {
        if let Some(existing) = ctx.guard(tx.lock_active_cart(customer)).await? {
            return Err(CartError::DuplicateActiveCart {
                customer,
                existing: CartId::Sequential(existing),
            });
        }

        let key = ctx.guard(tx.insert_cart(customer)).await?;

        Ok(CreatedCart {
            id: CartId::Sequential(key),
            status: CartStatus::Active,
        })
    }

    async fn upsert_in(
        ctx: &OpContext,
        tx: &mut B::Tx,
        cart: CartId,
        key: u64,
        items: &[ItemUpdate],
    ) -> Result<(), CartError> {
        if !ctx.guard(tx.lock_cart(key)).await? {
            return Err(CartError::CartNotFound(cart));
        }

        // Ascending order keeps lock acquisition consistent across batches.
        let mut wanted: Vec<ProductId> = items.iter().map(|item| item.product_id).collect();
        wanted.sort_unstable();

        let found: FxHashSet<ProductId> = ctx
            .guard(tx.lock_products(&wanted))
            .await?
            .into_iter()
            .collect();

        let missing: Vec<ProductId> = wanted
            .into_iter()
            .filter(|product| !found.contains(product))
            .collect();

        if !missing.is_empty() {
            return Err(CartError::ProductNotFound(missing));
        }

        for item in items {
            ctx.guard(tx.upsert_item(key, item)).await?;
        }

        Ok(())
    }

    async fn finish<T>(
        ctx: &OpContext,
        tx: B::Tx,
        outcome: Result<T, CartError>,
    ) -> Result<T, CartError> {
        match outcome {
            Ok(value) => {
                ctx.guard(tx.commit()).await?;

                Ok(value)
            }
            Err(error) => {
                if let Err(rollback) = tx.rollback().await {
                    warn!("failed to roll back cart transaction: {rollback}");
                }

                Err(error)
            }
        }
    }
}

fn sequential_key(cart: CartId) -> Result<u64, CartError> {
    match cart {
        CartId::Sequential(key) => Ok(key),
        CartId::Token(_) => Err(CartError::invalid(format!(
            "cart {cart} is not a sequential cart id"
        ))),
    }
}

#[async_trait]
impl<B: RelationalBackend> CartStore for TransactionalStore<B> {
    fn capabilities(&self) -> StoreCapabilities {
        StoreCapabilities {
            supports_atomic_batch: true,
            enforces_single_active_cart: true,
            validates_references: true,
        }
    }

    fn parse_cart_id(&self, raw: &str) -> Result<CartId, CartError> {
        CartId::parse_sequential(raw).ok_or_else(|| CartError::invalid("invalid cart ID"))
    }

    async fn create_cart(
        &self,
        ctx: &OpContext,
        customer: CustomerId,
    ) -> Result<CreatedCart, CartError> {
        let mut tx = ctx.guard(self.backend.begin()).await?;
        let outcome = Self::create_in(ctx, &mut tx, customer).await;
        let created = Self::finish(ctx, tx, outcome).await?;

        debug!(cart = %created.id, customer = %customer, "created cart");

        Ok(created)
    }

    async fn get_cart(&self, ctx: &OpContext, cart: CartId) -> Result<Cart, CartError> {
        let key = sequential_key(cart)?;

        ctx.guard(self.backend.fetch_cart(key))
            .await?
            .ok_or(CartError::CartNotFound(cart))
    }

    async fn upsert_items(
        &self,
        ctx: &OpContext,
        cart: CartId,
        items: &[ItemUpdate],
    ) -> Result<(), CartError> {
        let key = sequential_key(cart)?;

        let mut tx = ctx.guard(self.backend.begin()).await?;
        let outcome = Self::upsert_in(ctx, &mut tx, cart, key, items).await;

        Self::finish(ctx, tx, outcome).await?;

        debug!(cart = %cart, items = items.len(), "committed item batch");

        Ok(())
    }

    async fn purge(&self, ctx: &OpContext) -> Result<(), CartError> {
        ctx.guard(self.backend.purge()).await?;

        Ok(())
    }
}
