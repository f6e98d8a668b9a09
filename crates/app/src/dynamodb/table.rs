//! DynamoDB implementation of the single-table backend primitives

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::{
    Client,
    operation::put_item::PutItemError,
    types::{AttributeValue, DeleteRequest, PutRequest, WriteRequest},
};
use tracing::{debug, warn};

use carts::{
    prelude::{SingleTableBackend, StoreError},
    store::records::{self, Item},
};

use crate::dynamodb::attributes::{SdkItem, from_sdk, to_sdk};

/// Largest number of requests `BatchWriteItem` accepts.
const MAX_BATCH_WRITE: usize = 25;

#[derive(Debug, Clone)]
pub struct DynamoCartTable {
    client: Client,
    table_name: String,
}

impl DynamoCartTable {
    #[must_use]
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Send `requests` in chunks, stopping at the first chunk that fails or
    /// comes back with unprocessed requests.
    async fn batch_write(&self, requests: Vec<WriteRequest>) -> Result<(), StoreError> {
        for (chunk, remaining) in chunks_with_remaining(&requests) {
            let output = self
                .client
                .batch_write_item()
                .request_items(self.table_name.clone(), chunk.to_vec())
                .send()
                .await
                .map_err(|e| StoreError::backend("batch write failed", e))?;

            let unprocessed = output
                .unprocessed_items()
                .and_then(|items| items.get(&self.table_name))
                .map_or(0, Vec::len);

            if unprocessed > 0 {
                warn!(
                    table = %self.table_name,
                    unprocessed,
                    remaining,
                    "batch write left requests unprocessed"
                );

                return Err(unprocessed_error(unprocessed, remaining));
            }
        }

        Ok(())
    }

    async fn scan_keys(&self) -> Result<Vec<SdkItem>, StoreError> {
        let mut keys = Vec::new();
        let mut start: Option<SdkItem> = None;

        loop {
            let output = self
                .client
                .scan()
                .table_name(&self.table_name)
                .projection_expression(format!("{}, {}", records::PK, records::SK))
                .set_exclusive_start_key(start.take())
                .send()
                .await
                .map_err(|e| StoreError::backend("scan failed", e))?;

            keys.extend(output.items().iter().cloned());

            match output.last_evaluated_key() {
                Some(key) => start = Some(key.clone()),
                None => break,
            }
        }

        Ok(keys)
    }
}

/// Split `requests` into batch-sized chunks, pairing each chunk with the
/// number of requests queued after it.
fn chunks_with_remaining<T>(requests: &[T]) -> impl Iterator<Item = (&[T], usize)> {
    let total = requests.len();

    requests
        .chunks(MAX_BATCH_WRITE)
        .enumerate()
        .map(move |(index, chunk)| (chunk, total - index * MAX_BATCH_WRITE - chunk.len()))
}

/// Requests a failed chunk leaves unapplied: its own leftovers plus every
/// chunk that was never sent.
fn unprocessed_error(unprocessed: usize, remaining: usize) -> StoreError {
    StoreError::Unprocessed {
        unprocessed: unprocessed + remaining,
    }
}

#[async_trait]
impl SingleTableBackend for DynamoCartTable {
    async fn put_if_absent(&self, item: Item) -> Result<(), StoreError> {
        let result = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(to_sdk(item)))
            .condition_expression(format!("attribute_not_exists({})", records::PK))
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e)
                if e.as_service_error()
                    .is_some_and(PutItemError::is_conditional_check_failed_exception) =>
            {
                Err(StoreError::ConditionFailed(
                    "a record with this key already exists".to_string(),
                ))
            }
            Err(e) => Err(StoreError::backend("put item failed", e)),
        }
    }

    async fn query_partition(&self, partition: &str) -> Result<Vec<Item>, StoreError> {
        let mut items = Vec::new();
        let mut start: Option<SdkItem> = None;

        loop {
            let output = self
                .client
                .query()
                .table_name(&self.table_name)
                .key_condition_expression(format!("{} = :pk", records::PK))
                .expression_attribute_values(":pk", AttributeValue::S(partition.to_owned()))
                .set_exclusive_start_key(start.take())
                .send()
                .await
                .map_err(|e| StoreError::backend("query failed", e))?;

            items.extend(output.items().iter().map(from_sdk));

            match output.last_evaluated_key() {
                Some(key) => start = Some(key.clone()),
                None => break,
            }
        }

        Ok(items)
    }

    async fn batch_put(&self, items: Vec<Item>) -> Result<(), StoreError> {
        let requests = items
            .into_iter()
            .map(|item| {
                let put = PutRequest::builder()
                    .set_item(Some(to_sdk(item)))
                    .build()
                    .map_err(|e| StoreError::backend("invalid put request", e))?;

                Ok(WriteRequest::builder().put_request(put).build())
            })
            .collect::<Result<Vec<_>, StoreError>>()?;

        self.batch_write(requests).await
    }

    async fn purge(&self) -> Result<(), StoreError> {
        let keys = self.scan_keys().await?;
        let count = keys.len();

        let requests = keys
            .into_iter()
            .map(|key| {
                let key: HashMap<_, _> = key
                    .into_iter()
                    .filter(|(name, _)| name == records::PK || name == records::SK)
                    .collect();

                let delete = DeleteRequest::builder()
                    .set_key(Some(key))
                    .build()
                    .map_err(|e| StoreError::backend("invalid delete request", e))?;

                Ok(WriteRequest::builder().delete_request(delete).build())
            })
            .collect::<Result<Vec<_>, StoreError>>()?;

        self.batch_write(requests).await?;

        debug!(table = %self.table_name, records = count, "purged cart table");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(total: usize) -> Vec<(usize, usize)> {
        let requests = vec![0_u8; total];

        chunks_with_remaining(&requests)
            .map(|(chunk, remaining)| (chunk.len(), remaining))
            .collect()
    }

    #[test]
    fn empty_batches_send_nothing() {
        assert!(plan(0).is_empty());
    }

    #[test]
    fn full_chunk_leaves_nothing_queued() {
        assert_eq!(plan(25), vec![(25, 0)]);
    }

    #[test]
    fn overflow_spills_into_further_chunks() {
        assert_eq!(plan(26), vec![(25, 1), (1, 0)]);
        assert_eq!(plan(51), vec![(25, 26), (25, 1), (1, 0)]);
    }

    #[test]
    fn failed_chunk_counts_unsent_requests() {
        let error = unprocessed_error(3, 26);

        assert!(
            matches!(error, StoreError::Unprocessed { unprocessed: 29 }),
            "expected 29 unprocessed, got {error:?}"
        );
    }
}
