//! MySQL cart and catalog storage

mod backend;
mod catalog;
mod errors;
mod repositories;

pub use backend::{MySqlCarts, MySqlTransaction};
pub use catalog::MySqlCatalog;
