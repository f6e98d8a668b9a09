//! Carts prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    allocator::{IdentityAllocator, RandomTokens},
    catalog::{
        Catalog, CatalogBackend, MockProductsService, Product, ProductsService, SearchResults,
    },
    context::OpContext,
    errors::{CartError, CatalogError, ErrorKind, StoreError},
    ids::{CartId, CustomerId, ProductId},
    memory::{MemoryDatabase, MemoryTable},
    models::{Cart, CartItem, CartStatus, CreatedCart, ItemUpdate, UpdateOutcome},
    oracle::{ProductNames, ProductOracle, SyntheticCatalog},
    service::{CartEngine, CartsService, MockCartsService},
    store::{
        CartStore, ConditionalStore, RelationalBackend, RelationalTransaction,
        SingleTableBackend, StoreCapabilities, TransactionalStore,
    },
};
