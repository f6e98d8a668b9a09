//! Product catalog
//!
//! Lookup, detail updates and sampled search over the products carts refer
//! to. Only the relational store keeps a catalog.

use std::time::Instant;

use async_trait::async_trait;
use mockall::automock;
use tracing::{debug, info};

use crate::{
    context::OpContext,
    errors::{CatalogError, StoreError},
    ids::ProductId,
};

mod models;
pub mod search;

pub use models::{Product, SearchResults};

use search::{RESULT_LIMIT, SAMPLE_SIZE, SampleWindow};

/// Storage primitives behind the catalog.
#[async_trait]
pub trait CatalogBackend: Send + Sync {
    /// Read one product. `None` when no row exists.
    async fn fetch_product(&self, product: ProductId) -> Result<Option<Product>, StoreError>;

    /// Lock the product row and overwrite its descriptive fields.
    ///
    /// Returns `false`, writing nothing, when the product does not exist.
    async fn update_product(&self, product: &Product) -> Result<bool, StoreError>;

    /// Number of catalog rows.
    async fn count_products(&self) -> Result<u64, StoreError>;

    /// Up to `limit` products in key order after skipping `offset`.
    async fn product_window(&self, offset: u64, limit: u64) -> Result<Vec<Product>, StoreError>;
}

/// Catalog operations offered to the HTTP layer.
#[automock]
#[async_trait]
pub trait ProductsService: Send + Sync {
    /// Retrieve a product by external identifier.
    async fn get_product(&self, ctx: &OpContext, product: &str) -> Result<Product, CatalogError>;

    /// Replace the details of an existing product.
    ///
    /// `details.id` must name the same product as `product`.
    async fn update_product(
        &self,
        ctx: &OpContext,
        product: &str,
        details: Product,
    ) -> Result<(), CatalogError>;

    /// Sampled search over product names and categories.
    async fn search_products(
        &self,
        ctx: &OpContext,
        query: &str,
    ) -> Result<SearchResults, CatalogError>;
}

/// Validates catalog requests, then delegates to a [`CatalogBackend`].
#[derive(Debug, Clone)]
pub struct Catalog<B> {
    backend: B,
}

impl<B: CatalogBackend> Catalog<B> {
    /// Drive `backend`.
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Underlying backend.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }
}

#[async_trait]
impl<B: CatalogBackend> ProductsService for Catalog<B> {
    async fn get_product(&self, ctx: &OpContext, product: &str) -> Result<Product, CatalogError> {
        let product = parse_product(product)?;

        ctx.guard(self.backend.fetch_product(product))
            .await?
            .ok_or(CatalogError::ProductNotFound(product))
    }

    async fn update_product(
        &self,
        ctx: &OpContext,
        product: &str,
        details: Product,
    ) -> Result<(), CatalogError> {
        let product = parse_product(product)?;

        validate_details(product, &details)?;

        if !ctx.guard(self.backend.update_product(&details)).await? {
            return Err(CatalogError::ProductNotFound(product));
        }

        info!(product = %product, "product details updated");

        Ok(())
    }

    async fn search_products(
        &self,
        ctx: &OpContext,
        query: &str,
    ) -> Result<SearchResults, CatalogError> {
        let started = Instant::now();

        let total = ctx.guard(self.backend.count_products()).await?;
        let window = SampleWindow::pick(total, SAMPLE_SIZE, &mut rand::thread_rng());

        let candidates = ctx
            .guard(self.backend.product_window(window.offset, window.limit))
            .await?;

        let products = search::matching(candidates, query, RESULT_LIMIT);

        debug!(
            total,
            offset = window.offset,
            found = products.len(),
            "catalog searched"
        );

        Ok(SearchResults {
            total_found: products.len(),
            products,
            elapsed: started.elapsed(),
        })
    }
}

fn parse_product(raw: &str) -> Result<ProductId, CatalogError> {
    ProductId::parse(raw).ok_or_else(|| {
        CatalogError::invalid(format!(
            "product ID must be a positive integer >= 1 (input: {raw})"
        ))
    })
}

fn validate_details(product: ProductId, details: &Product) -> Result<(), CatalogError> {
    if details.id != product {
        return Err(CatalogError::invalid(
            "the product_id in the request body is different from the product_id in the path",
        ));
    }

    let fields = [
        ("name", &details.name),
        ("category", &details.category),
        ("brand", &details.brand),
        ("description", &details.description),
    ];

    if let Some((field, _)) = fields.iter().find(|(_, value)| value.trim().is_empty()) {
        return Err(CatalogError::invalid(format!("{field} must not be empty")));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lamp(id: u32) -> Product {
        Product {
            id: ProductId::new(id),
            name: "Desk Lamp".to_owned(),
            category: "Lighting".to_owned(),
            brand: "Lumen".to_owned(),
            description: "Adjustable arm".to_owned(),
        }
    }

    #[test]
    fn details_must_target_the_path_product() {
        let result = validate_details(ProductId::new(2), &lamp(3));

        assert!(
            matches!(result, Err(CatalogError::InvalidInput(ref message)) if message.contains("different")),
            "expected InvalidInput, got {result:?}"
        );
    }

    #[test]
    fn blank_fields_are_rejected() {
        let details = Product {
            brand: "  ".to_owned(),
            ..lamp(3)
        };

        let result = validate_details(ProductId::new(3), &details);

        assert!(
            matches!(result, Err(CatalogError::InvalidInput(ref message)) if message == "brand must not be empty"),
            "expected InvalidInput, got {result:?}"
        );
    }

    #[test]
    fn complete_details_pass() {
        assert!(validate_details(ProductId::new(3), &lamp(3)).is_ok());
    }
}
