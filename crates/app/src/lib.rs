//! Cart application wiring: MySQL and DynamoDB adapters for the cart engine.

pub mod context;
pub mod database;
pub mod dynamodb;
pub mod relational;
