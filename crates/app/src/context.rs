//! App Context

use std::sync::Arc;

use clap::ValueEnum;
use sqlx::{MySqlPool, migrate::MigrateError};
use thiserror::Error;
use tracing::info;

use carts::prelude::{
    CartEngine, CartsService, Catalog, ConditionalStore, ProductsService, TransactionalStore,
};

use crate::{
    database::{self, PoolSettings},
    dynamodb::{self, DynamoCartTable},
    relational::{MySqlCarts, MySqlCatalog},
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to run database migrations")]
    Migrate(#[source] MigrateError),

    #[error("missing required setting `{0}`")]
    MissingSetting(&'static str),
}

/// Storage strategy behind the cart service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CartBackend {
    /// Locked transactions against `MySQL`.
    Mysql,

    /// Conditional writes against a `DynamoDB` table.
    Dynamodb,
}

/// Everything needed to open the selected backend.
#[derive(Debug, Clone)]
pub struct BackendSettings {
    pub backend: CartBackend,
    pub database_url: Option<String>,
    pub pool: PoolSettings,
    pub run_migrations: bool,
    pub table_name: Option<String>,
}

#[derive(Clone)]
pub struct AppContext {
    pub carts: Arc<dyn CartsService>,

    /// Product catalog, when the backend keeps one.
    pub products: Option<Arc<dyn ProductsService>>,
}

impl AppContext {
    /// Wrap an already built cart service.
    #[must_use]
    pub fn new(carts: Arc<dyn CartsService>) -> Self {
        Self {
            carts,
            products: None,
        }
    }

    /// Attach a product catalog.
    #[must_use]
    pub fn with_products(mut self, products: Arc<dyn ProductsService>) -> Self {
        self.products = Some(products);
        self
    }

    /// Build application context for the configured backend.
    ///
    /// # Errors
    ///
    /// Returns an error when a required setting is absent, the database is
    /// unreachable or its migrations fail.
    pub async fn from_settings(settings: &BackendSettings) -> Result<Self, AppInitError> {
        match settings.backend {
            CartBackend::Mysql => {
                let url = settings
                    .database_url
                    .as_deref()
                    .ok_or(AppInitError::MissingSetting("DATABASE_URL"))?;

                let pool = database::connect(url, settings.pool)
                    .await
                    .map_err(AppInitError::Database)?;

                if settings.run_migrations {
                    database::migrate(&pool)
                        .await
                        .map_err(AppInitError::Migrate)?;
                }

                info!("using MySQL cart backend");

                Ok(Self::mysql(pool))
            }
            CartBackend::Dynamodb => {
                let table_name = settings
                    .table_name
                    .as_deref()
                    .ok_or(AppInitError::MissingSetting("DYNAMODB_TABLE_NAME"))?;

                let table = dynamodb::connect(table_name).await;

                info!(table = table_name, "using DynamoDB cart backend");

                Ok(Self::dynamodb(table))
            }
        }
    }

    /// Cart service and product catalog over a `MySQL` pool.
    #[must_use]
    pub fn mysql(pool: MySqlPool) -> Self {
        Self::new(Arc::new(CartEngine::new(TransactionalStore::new(
            MySqlCarts::new(pool.clone()),
        ))))
        .with_products(Arc::new(Catalog::new(MySqlCatalog::new(pool))))
    }

    /// Cart service over a `DynamoDB` table. No catalog is served.
    #[must_use]
    pub fn dynamodb(table: DynamoCartTable) -> Self {
        Self::new(Arc::new(CartEngine::new(ConditionalStore::new(table))))
    }
}
