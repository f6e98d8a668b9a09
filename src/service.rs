//! Carts service.

use async_trait::async_trait;
use mockall::automock;
use tracing::info;

use crate::{
    context::OpContext,
    errors::CartError,
    ids::CustomerId,
    models::{Cart, CreatedCart, ItemUpdate, UpdateOutcome},
    policy,
    store::{CartStore, StoreCapabilities},
};

/// Applies the consistency policy, then delegates to a [`CartStore`].
#[derive(Debug, Clone)]
pub struct CartEngine<S> {
    store: S,
}

impl<S: CartStore> CartEngine<S> {
    /// Drive `store`.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Underlying store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }
}

#[async_trait]
impl<S: CartStore> CartsService for CartEngine<S> {
    fn capabilities(&self) -> StoreCapabilities {
        self.store.capabilities()
    }

    async fn create_cart(
        &self,
        ctx: &OpContext,
        customer: CustomerId,
    ) -> Result<CreatedCart, CartError> {
        let customer = policy::validate_customer(customer)?;
        let created = self.store.create_cart(ctx, customer).await?;

        info!(cart = %created.id, customer = %customer, "cart created");

        Ok(created)
    }

    async fn get_cart(&self, ctx: &OpContext, cart: &str) -> Result<Cart, CartError> {
        let cart = self.store.parse_cart_id(cart)?;

        self.store.get_cart(ctx, cart).await
    }

    async fn update_items(
        &self,
        ctx: &OpContext,
        cart: &str,
        items: Vec<ItemUpdate>,
    ) -> Result<UpdateOutcome, CartError> {
        let cart = self.store.parse_cart_id(cart)?;
        let items = policy::prepare_batch(items)?;

        if items.is_empty() {
            return Ok(UpdateOutcome {
                cart_id: cart,
                applied: 0,
            });
        }

        self.store.upsert_items(ctx, cart, &items).await?;

        info!(cart = %cart, applied = items.len(), "cart items updated");

        Ok(UpdateOutcome {
            cart_id: cart,
            applied: items.len(),
        })
    }

    async fn clear_carts(&self, ctx: &OpContext) -> Result<(), CartError> {
        self.store.purge(ctx).await?;

        info!("cart data cleared");

        Ok(())
    }
}

/// Cart operations offered to the HTTP layer.
#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// Guarantees of the configured store.
    fn capabilities(&self) -> StoreCapabilities;

    /// Create an active cart for `customer`.
    async fn create_cart(
        &self,
        ctx: &OpContext,
        customer: CustomerId,
    ) -> Result<CreatedCart, CartError>;

    /// Retrieve a cart and its items by external identifier.
    async fn get_cart(&self, ctx: &OpContext, cart: &str) -> Result<Cart, CartError>;

    /// Apply a batch of quantity changes to a cart.
    async fn update_items(
        &self,
        ctx: &OpContext,
        cart: &str,
        items: Vec<ItemUpdate>,
    ) -> Result<UpdateOutcome, CartError>;

    /// Remove every cart and item.
    async fn clear_carts(&self, ctx: &OpContext) -> Result<(), CartError>;
}
