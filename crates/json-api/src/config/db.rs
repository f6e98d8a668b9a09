//! Database Config

use std::time::Duration;

use clap::{ArgAction, Args};

use carts_app::{
    context::{BackendSettings, CartBackend},
    database::PoolSettings,
};

/// Cart storage settings.
#[derive(Debug, Args)]
pub struct DatabaseConfig {
    /// Storage backend (mysql, dynamodb)
    #[arg(long, env = "CART_BACKEND", value_enum, default_value_t = CartBackend::Mysql)]
    pub backend: CartBackend,

    /// `MySQL` connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    /// Maximum pooled connections
    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value_t = 3_u32)]
    pub max_connections: u32,

    /// Minimum idle connections kept open
    #[arg(long, env = "DB_MIN_CONNECTIONS", default_value_t = 1_u32)]
    pub min_connections: u32,

    /// Maximum lifetime of a pooled connection, in seconds
    #[arg(long, env = "DB_CONN_MAX_LIFETIME_SECS", default_value_t = 300_u64)]
    pub conn_max_lifetime_secs: u64,

    /// Apply schema migrations on startup
    #[arg(long, env = "DB_RUN_MIGRATIONS", default_value_t = true, action = ArgAction::Set)]
    pub run_migrations: bool,

    /// `DynamoDB` table holding cart records
    #[arg(long, env = "DYNAMODB_TABLE_NAME")]
    pub table_name: Option<String>,
}

impl DatabaseConfig {
    #[must_use]
    pub fn backend_settings(&self) -> BackendSettings {
        BackendSettings {
            backend: self.backend,
            database_url: self.database_url.clone(),
            pool: PoolSettings {
                max_connections: self.max_connections,
                min_connections: self.min_connections,
                max_lifetime: Duration::from_secs(self.conn_max_lifetime_secs),
            },
            run_migrations: self.run_migrations,
            table_name: self.table_name.clone(),
        }
    }
}
