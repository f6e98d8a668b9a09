//! DynamoDB cart storage

use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::Client;

mod attributes;
mod table;

pub use table::DynamoCartTable;

/// Build a table handle from the ambient AWS configuration.
pub async fn connect(table_name: impl Into<String>) -> DynamoCartTable {
    let config = aws_config::load_defaults(BehaviorVersion::latest()).await;

    DynamoCartTable::new(Client::new(&config), table_name)
}
