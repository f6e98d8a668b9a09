//! Product bodies

use serde::{Deserialize, Serialize};

use carts::prelude::{Product, ProductId, SearchResults};

/// Product as it appears on the wire, in both directions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct ProductBody {
    pub product_id: u32,
    pub name: String,
    pub category: String,
    pub description: String,
    pub brand: String,
}

impl From<Product> for ProductBody {
    fn from(product: Product) -> Self {
        Self {
            product_id: product.id.get(),
            name: product.name,
            category: product.category,
            description: product.description,
            brand: product.brand,
        }
    }
}

impl From<ProductBody> for Product {
    fn from(body: ProductBody) -> Self {
        Product {
            id: ProductId::new(body.product_id),
            name: body.name,
            category: body.category,
            brand: body.brand,
            description: body.description,
        }
    }
}

/// Search Response
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct SearchResponse {
    /// Matches in key order
    pub products: Vec<ProductBody>,

    /// Number of matches returned
    pub total_found: usize,

    /// Seconds spent searching, e.g. `0.000412s`
    pub search_time: String,
}

impl From<SearchResults> for SearchResponse {
    fn from(results: SearchResults) -> Self {
        Self {
            products: results.products.into_iter().map(ProductBody::from).collect(),
            total_found: results.total_found,
            search_time: format!("{:.6}s", results.elapsed.as_secs_f64()),
        }
    }
}
