//! Cart engine errors.

use std::error::Error as StdError;

use thiserror::Error;

use crate::ids::{CartId, CustomerId, ProductId};

/// Boxed backend error.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Errors surfaced by cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Malformed or zero identifier, or an otherwise unusable request.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The same product appeared more than once in a single update batch.
    #[error("duplicate product_ids in request: {}", join_ids(.0))]
    DuplicateProductInRequest(Vec<ProductId>),

    /// No cart exists with the given identity.
    #[error("cart {0} not found")]
    CartNotFound(CartId),

    /// One or more referenced products do not exist.
    #[error("products not found: {}", join_ids(.0))]
    ProductNotFound(Vec<ProductId>),

    /// The customer already owns an active cart.
    #[error("customer {customer} already has active cart {existing}")]
    DuplicateActiveCart {
        /// Customer that asked for a new cart
        customer: CustomerId,

        /// Their current active cart
        existing: CartId,
    },

    /// Item records exist for a cart whose metadata record is missing.
    #[error("cart {0} has items but no metadata record")]
    CorruptedCart(CartId),

    /// The storage layer failed; the operation was aborted.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

/// Coarse classification of a [`CartError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Caller sent something unusable.
    InvalidInput,

    /// Target cart is missing.
    CartNotFound,

    /// Referenced product is missing.
    ProductNotFound,

    /// Business rule: one active cart per customer.
    DuplicateActiveCart,

    /// Stored data is internally inconsistent.
    CorruptedCart,

    /// Storage failure.
    Store,
}

impl CartError {
    /// Classification used by callers to pick a response.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) | Self::DuplicateProductInRequest(_) => ErrorKind::InvalidInput,
            Self::CartNotFound(_) => ErrorKind::CartNotFound,
            Self::ProductNotFound(_) => ErrorKind::ProductNotFound,
            Self::DuplicateActiveCart { .. } => ErrorKind::DuplicateActiveCart,
            Self::CorruptedCart(_) => ErrorKind::CorruptedCart,
            Self::Store(_) => ErrorKind::Store,
        }
    }

    /// Shorthand for [`CartError::InvalidInput`].
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

/// Errors surfaced by catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Malformed product identifier or unusable product details.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No catalog entry exists for the product.
    #[error("no product found for ID {0}")]
    ProductNotFound(ProductId),

    /// The storage layer failed; the operation was aborted.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

impl CatalogError {
    /// Classification used by callers to pick a response.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::ProductNotFound(_) => ErrorKind::ProductNotFound,
            Self::Store(_) => ErrorKind::Store,
        }
    }

    /// Shorthand for [`CatalogError::InvalidInput`].
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

/// Storage failures.
///
/// None of these are retried by the engine.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A conditional write found an existing record.
    #[error("conditional write rejected: {0}")]
    ConditionFailed(String),

    /// Waiting for a row lock took longer than the store allows.
    #[error("timed out waiting for a row lock")]
    LockTimeout,

    /// The store chose this transaction as a deadlock victim.
    #[error("transaction aborted by deadlock detection")]
    Deadlock,

    /// A schema constraint rejected a write.
    #[error("constraint violated: {0}")]
    Constraint(String),

    /// Part of a batch write was not applied.
    #[error("batch write left {unprocessed} record(s) unprocessed")]
    Unprocessed {
        /// Records the store refused to apply
        unprocessed: usize,
    },

    /// A stored record could not be decoded.
    #[error("malformed record: {0}")]
    Malformed(String),

    /// The caller cancelled the operation.
    #[error("operation cancelled")]
    Cancelled,

    /// The caller's deadline passed before the store answered.
    #[error("operation deadline exceeded")]
    DeadlineExceeded,

    /// Connectivity or driver failure.
    #[error("{context}: {source}")]
    Backend {
        /// What the store was doing
        context: String,

        /// Driver error
        #[source]
        source: BoxError,
    },
}

impl StoreError {
    /// Wrap a driver error with a short description of the failed step.
    pub fn backend(context: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Backend {
            context: context.into(),
            source: source.into(),
        }
    }
}

fn join_ids(ids: &[ProductId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
