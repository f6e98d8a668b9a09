//! MySQL implementation of the relational backend primitives

use async_trait::async_trait;
use sqlx::{MySql, MySqlPool, Transaction};
use tracing::debug;

use carts::prelude::{
    Cart, CustomerId, ItemUpdate, ProductId, RelationalBackend, RelationalTransaction, StoreError,
};

use crate::relational::{
    errors::store_error,
    repositories::{CartRow, MySqlCartsRepository, MySqlItemsRepository, MySqlProductsRepository},
};

/// Shared MySQL pool plus the statements run against it.
#[derive(Debug, Clone)]
pub struct MySqlCarts {
    pool: MySqlPool,
    carts: MySqlCartsRepository,
    items: MySqlItemsRepository,
    products: MySqlProductsRepository,
}

impl MySqlCarts {
    #[must_use]
    pub fn new(pool: MySqlPool) -> Self {
        Self {
            pool,
            carts: MySqlCartsRepository::new(),
            items: MySqlItemsRepository::new(),
            products: MySqlProductsRepository::new(),
        }
    }

    #[must_use]
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

#[async_trait]
impl RelationalBackend for MySqlCarts {
    type Tx = MySqlTransaction;

    async fn begin(&self) -> Result<Self::Tx, StoreError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| store_error("failed to begin transaction", e))?;

        Ok(MySqlTransaction {
            tx,
            carts: self.carts,
            items: self.items,
            products: self.products,
        })
    }

    async fn fetch_cart(&self, cart: u64) -> Result<Option<Cart>, StoreError> {
        let rows = self
            .carts
            .get_cart(&self.pool, cart)
            .await
            .map_err(|e| store_error("failed to fetch cart", e))?;

        Ok(CartRow::fold(rows))
    }

    async fn purge(&self) -> Result<(), StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| store_error("failed to begin transaction", e))?;

        let items = self
            .items
            .delete_items(&mut tx)
            .await
            .map_err(|e| store_error("failed to delete cart items", e))?;

        let carts = self
            .carts
            .delete_carts(&mut tx)
            .await
            .map_err(|e| store_error("failed to delete carts", e))?;

        tx.commit()
            .await
            .map_err(|e| store_error("failed to commit purge", e))?;

        debug!(carts, items, "purged cart tables");

        Ok(())
    }
}

/// Open MySQL transaction. Rolled back on drop unless committed.
#[derive(Debug)]
pub struct MySqlTransaction {
    tx: Transaction<'static, MySql>,
    carts: MySqlCartsRepository,
    items: MySqlItemsRepository,
    products: MySqlProductsRepository,
}

#[async_trait]
impl RelationalTransaction for MySqlTransaction {
    async fn lock_active_cart(&mut self, customer: CustomerId) -> Result<Option<u64>, StoreError> {
        self.carts
            .lock_active_cart(&mut self.tx, customer)
            .await
            .map_err(|e| store_error("failed to lock active cart", e))
    }

    async fn insert_cart(&mut self, customer: CustomerId) -> Result<u64, StoreError> {
        self.carts
            .create_cart(&mut self.tx, customer)
            .await
            .map_err(|e| store_error("failed to insert cart", e))
    }

    async fn lock_cart(&mut self, cart: u64) -> Result<bool, StoreError> {
        self.carts
            .lock_cart(&mut self.tx, cart)
            .await
            .map_err(|e| store_error("failed to lock cart", e))
    }

    async fn lock_products(&mut self, products: &[ProductId]) -> Result<Vec<ProductId>, StoreError> {
        self.products
            .lock_products(&mut self.tx, products)
            .await
            .map_err(|e| store_error("failed to lock products", e))
    }

    async fn upsert_item(&mut self, cart: u64, item: &ItemUpdate) -> Result<(), StoreError> {
        self.items
            .upsert_item(&mut self.tx, cart, item)
            .await
            .map_err(|e| store_error("failed to upsert cart item", e))
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.tx
            .commit()
            .await
            .map_err(|e| store_error("failed to commit transaction", e))
    }

    async fn rollback(self) -> Result<(), StoreError> {
        self.tx
            .rollback()
            .await
            .map_err(|e| store_error("failed to roll back transaction", e))
    }
}
