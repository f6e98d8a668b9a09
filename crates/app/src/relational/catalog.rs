//! MySQL implementation of the catalog primitives

use async_trait::async_trait;
use sqlx::MySqlPool;
use tracing::debug;

use carts::prelude::{CatalogBackend, Product, ProductId, StoreError};

use crate::relational::{errors::store_error, repositories::MySqlProductsRepository};

/// Product catalog held in the `product` table.
#[derive(Debug, Clone)]
pub struct MySqlCatalog {
    pool: MySqlPool,
    products: MySqlProductsRepository,
}

impl MySqlCatalog {
    #[must_use]
    pub fn new(pool: MySqlPool) -> Self {
        Self {
            pool,
            products: MySqlProductsRepository::new(),
        }
    }
}

#[async_trait]
impl CatalogBackend for MySqlCatalog {
    async fn fetch_product(&self, product: ProductId) -> Result<Option<Product>, StoreError> {
        self.products
            .get_product(&self.pool, product)
            .await
            .map_err(|e| store_error("failed to fetch product", e))
    }

    async fn update_product(&self, product: &Product) -> Result<bool, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| store_error("failed to begin transaction", e))?;

        let exists = self
            .products
            .lock_product(&mut tx, product.id)
            .await
            .map_err(|e| store_error("failed to lock product", e))?;

        if !exists {
            debug!(product = %product.id, "product to update does not exist");

            return Ok(false);
        }

        self.products
            .update_product(&mut tx, product)
            .await
            .map_err(|e| store_error("failed to update product", e))?;

        tx.commit()
            .await
            .map_err(|e| store_error("failed to commit product update", e))?;

        Ok(true)
    }

    async fn count_products(&self) -> Result<u64, StoreError> {
        let count = self
            .products
            .count_products(&self.pool)
            .await
            .map_err(|e| store_error("failed to count products", e))?;

        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn product_window(&self, offset: u64, limit: u64) -> Result<Vec<Product>, StoreError> {
        self.products
            .product_window(&self.pool, offset, limit)
            .await
            .map_err(|e| store_error("failed to read product window", e))
    }
}
