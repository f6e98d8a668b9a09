use clap::{Parser, Subcommand};

mod carts;
mod db;

#[derive(Debug, Parser)]
#[command(name = "carts-app", about = "Shopping cart CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Carts(carts::CartsCommand),
    Db(db::DbCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Carts(command) => carts::run(command).await,
            Commands::Db(command) => db::run(command).await,
        }
    }
}
