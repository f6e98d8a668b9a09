//! In-memory backends
//!
//! Both implement the same primitive interfaces as the production stores,
//! with the same failure modes, so the engine can be exercised without
//! external services.

mod database;
mod table;

pub use database::{MemoryDatabase, MemoryTransaction};
pub use table::MemoryTable;
