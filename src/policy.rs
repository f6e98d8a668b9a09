//! Consistency policy
//!
//! Checks that hold for every store, applied before any storage call.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::{
    errors::CartError,
    ids::{CustomerId, ProductId},
    models::ItemUpdate,
};

/// Reject the zero customer.
///
/// # Errors
///
/// Returns [`CartError::InvalidInput`] when `customer` is zero.
pub fn validate_customer(customer: CustomerId) -> Result<CustomerId, CartError> {
    if customer.get() == 0 {
        return Err(CartError::invalid("customer_id cannot be 0"));
    }

    Ok(customer)
}

/// Product ids that appear more than once, each reported once, in order of
/// first appearance.
#[must_use]
pub fn duplicate_products(items: &[ItemUpdate]) -> Vec<ProductId> {
    let mut counts: FxHashMap<ProductId, usize> = FxHashMap::default();

    for item in items {
        *counts.entry(item.product_id).or_default() += 1;
    }

    let mut reported = FxHashSet::default();

    items
        .iter()
        .map(|item| item.product_id)
        .filter(|product| counts.get(product).is_some_and(|count| *count > 1))
        .filter(|product| reported.insert(*product))
        .collect()
}

/// Validate an update batch and drop its zero-quantity entries.
///
/// Duplicate detection runs over the whole batch, zero quantities included,
/// so `[{5,0},{5,2}]` is still rejected.
///
/// # Errors
///
/// Returns [`CartError::DuplicateProductInRequest`] listing every repeated id.
pub fn prepare_batch(items: Vec<ItemUpdate>) -> Result<Vec<ItemUpdate>, CartError> {
    let duplicates = duplicate_products(&items);

    if !duplicates.is_empty() {
        return Err(CartError::DuplicateProductInRequest(duplicates));
    }

    Ok(items.into_iter().filter(|item| item.quantity > 0).collect())
}
