//! In-memory single-table store

use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use crate::{
    errors::StoreError,
    store::{
        SingleTableBackend,
        records::{self, Item},
    },
};

type PrimaryKey = (String, String);

#[derive(Debug, Default)]
struct TableState {
    records: RwLock<BTreeMap<PrimaryKey, Item>>,
    fail_after: Mutex<Option<usize>>,
}

/// Single-table store held in memory, keyed by `(PK, SK)`.
///
/// Batch writes apply one record at a time with no isolation, so concurrent
/// batches interleave and a failed batch leaves its prefix behind.
#[derive(Debug, Clone, Default)]
pub struct MemoryTable {
    state: Arc<TableState>,
}

impl MemoryTable {
    /// Empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next batch write stop after `applied` records and report the
    /// rest as unprocessed.
    pub async fn fail_next_batch_after(&self, applied: usize) {
        *self.state.fail_after.lock().await = Some(applied);
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.state.records.read().await.len()
    }

    /// Whether the table holds no records.
    pub async fn is_empty(&self) -> bool {
        self.state.records.read().await.is_empty()
    }

    /// Write a record with no condition.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Malformed`] when the record has no primary key.
    pub async fn put(&self, item: Item) -> Result<(), StoreError> {
        let key = records::primary_key(&item)?;

        self.state.records.write().await.insert(key, item);

        Ok(())
    }

    /// Delete one record by primary key.
    pub async fn delete(&self, partition: &str, sort: &str) {
        self.state
            .records
            .write()
            .await
            .remove(&(partition.to_owned(), sort.to_owned()));
    }
}

#[async_trait]
impl SingleTableBackend for MemoryTable {
    async fn put_if_absent(&self, item: Item) -> Result<(), StoreError> {
        let key = records::primary_key(&item)?;
        let mut stored = self.state.records.write().await;

        if stored.contains_key(&key) {
            return Err(StoreError::ConditionFailed(format!(
                "record {}/{} already exists",
                key.0, key.1
            )));
        }

        stored.insert(key, item);

        Ok(())
    }

    async fn query_partition(&self, partition: &str) -> Result<Vec<Item>, StoreError> {
        let stored = self.state.records.read().await;

        Ok(stored
            .range((partition.to_owned(), String::new())..)
            .take_while(|((pk, _), _)| pk == partition)
            .map(|(_, item)| item.clone())
            .collect())
    }

    async fn batch_put(&self, items: Vec<Item>) -> Result<(), StoreError> {
        let total = items.len();
        let fail_after = self.state.fail_after.lock().await.take();

        for (applied, item) in items.into_iter().enumerate() {
            if fail_after == Some(applied) {
                return Err(StoreError::Unprocessed {
                    unprocessed: total - applied,
                });
            }

            self.put(item).await?;
        }

        Ok(())
    }

    async fn purge(&self) -> Result<(), StoreError> {
        self.state.records.write().await.clear();

        Ok(())
    }
}
