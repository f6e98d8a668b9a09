//! Catalog models

use std::time::Duration;

use crate::ids::ProductId;

/// Catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    /// Catalog key
    pub id: ProductId,

    /// Display name, also used for cart item names
    pub name: String,

    /// Category
    pub category: String,

    /// Brand
    pub brand: String,

    /// Free-text description
    pub description: String,
}

impl Product {
    /// Entry carrying only a name.
    #[must_use]
    pub fn named(id: ProductId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            category: String::new(),
            brand: String::new(),
            description: String::new(),
        }
    }
}

/// Products matched by a catalog search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResults {
    /// Matches in key order
    pub products: Vec<Product>,

    /// Number of matches returned
    pub total_found: usize,

    /// Wall time spent searching
    pub elapsed: Duration,
}
