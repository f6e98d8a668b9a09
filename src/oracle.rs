//! Product existence oracle

use std::fmt::Debug;

use async_trait::async_trait;
use rustc_hash::FxHashMap;

use crate::{context::OpContext, errors::StoreError, ids::ProductId};

/// Display names keyed by product; absent keys are unknown products.
pub type ProductNames = FxHashMap<ProductId, String>;

/// Bulk product lookup.
#[async_trait]
pub trait ProductOracle: Debug + Send + Sync {
    /// Resolve which of `products` exist and what they are called.
    async fn resolve(
        &self,
        ctx: &OpContext,
        products: &[ProductId],
    ) -> Result<ProductNames, StoreError>;
}

/// Oracle that claims every product exists and names it `Widget #<id>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticCatalog;

impl SyntheticCatalog {
    /// Synthetic display name for `product`.
    #[must_use]
    pub fn name_of(product: ProductId) -> String {
        format!("Widget #{product}")
    }
}

#[async_trait]
impl ProductOracle for SyntheticCatalog {
    async fn resolve(
        &self,
        _ctx: &OpContext,
        products: &[ProductId],
    ) -> Result<ProductNames, StoreError> {
        Ok(products
            .iter()
            .map(|product| (*product, Self::name_of(*product)))
            .collect())
    }
}
