use carts::prelude::OpContext;
use carts_app::{
    context::{AppContext, BackendSettings, CartBackend},
    database::PoolSettings,
};
use clap::Args;

#[derive(Debug, Args)]
pub(crate) struct ClearArgs {
    /// Storage backend holding the carts
    #[arg(long, env = "CART_BACKEND", value_enum, default_value_t = CartBackend::Mysql)]
    backend: CartBackend,

    /// MySQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: Option<String>,

    /// DynamoDB table name
    #[arg(long, env = "DYNAMODB_TABLE_NAME")]
    table_name: Option<String>,
}

pub(crate) async fn run(args: ClearArgs) -> Result<(), String> {
    let settings = BackendSettings {
        backend: args.backend,
        database_url: args.database_url,
        pool: PoolSettings::default(),
        run_migrations: false,
        table_name: args.table_name,
    };

    let app = AppContext::from_settings(&settings)
        .await
        .map_err(|error| format!("failed to initialise backend: {error}"))?;

    app.carts
        .clear_carts(&OpContext::new())
        .await
        .map_err(|error| format!("failed to clear carts: {error}"))?;

    println!("shopping cart data cleared");

    Ok(())
}
