//! Sampled substring search
//!
//! A search never scans the whole catalog. It reads one window of
//! [`SAMPLE_SIZE`] consecutive products starting at a random offset and
//! keeps those whose name or category contains the query, ignoring case.

use rand::Rng;

use crate::catalog::Product;

/// Products read per search.
pub const SAMPLE_SIZE: u64 = 100;

/// Most matches a search returns.
pub const RESULT_LIMIT: usize = 20;

/// Slice of the catalog a search reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleWindow {
    /// Products skipped, in key order
    pub offset: u64,

    /// Products read
    pub limit: u64,
}

impl SampleWindow {
    /// Pick a window of `size` products out of `total`.
    ///
    /// Catalogs no larger than `size` are read whole.
    pub fn pick<R: Rng + ?Sized>(total: u64, size: u64, rng: &mut R) -> Self {
        if total > size {
            Self {
                offset: rng.gen_range(0..total - size),
                limit: size,
            }
        } else {
            Self {
                offset: 0,
                limit: total,
            }
        }
    }
}

/// Keep at most `limit` candidates whose name or category contains `query`.
///
/// An empty query matches everything.
#[must_use]
pub fn matching(candidates: Vec<Product>, query: &str, limit: usize) -> Vec<Product> {
    let needle = query.to_lowercase();

    candidates
        .into_iter()
        .filter(|product| {
            product.name.to_lowercase().contains(&needle)
                || product.category.to_lowercase().contains(&needle)
        })
        .take(limit)
        .collect()
}
