//! Carts
//!
//! Shopping cart mutation and consistency engine. Creates carts, reads them
//! back, and applies batches of item quantity changes over either a locked
//! relational store or a conditional single-table store. The relational
//! deployment also serves its product catalog.

pub mod allocator;
pub mod catalog;
pub mod context;
pub mod errors;
pub mod ids;
pub mod memory;
pub mod models;
pub mod oracle;
pub mod policy;
pub mod prelude;
pub mod service;
pub mod store;
