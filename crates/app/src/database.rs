//! Database connection management

use std::time::Duration;

use sqlx::{MySqlPool, migrate::MigrateError, mysql::MySqlPoolOptions};

/// Connection pool sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub min_connections: u32,
    pub max_lifetime: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 3,
            min_connections: 1,
            max_lifetime: Duration::from_secs(300),
        }
    }
}

/// Connect to `MySQL`.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str, settings: PoolSettings) -> Result<MySqlPool, sqlx::Error> {
    MySqlPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .max_lifetime(settings.max_lifetime)
        .connect(database_url)
        .await
}

/// Apply pending schema migrations.
///
/// # Errors
///
/// Returns an error if a migration fails or the applied history diverges.
pub async fn migrate(pool: &MySqlPool) -> Result<(), MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await
}
