//! In-memory relational store

use std::{
    collections::BTreeMap,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use rustc_hash::{FxHashMap, FxHashSet};
use tokio::{
    sync::{Mutex, OwnedMutexGuard, RwLock},
    time::timeout,
};

use crate::{
    catalog::{CatalogBackend, Product},
    errors::StoreError,
    ids::{CartId, CustomerId, ProductId},
    models::{Cart, CartItem, CartStatus, ItemUpdate},
    store::{RelationalBackend, RelationalTransaction},
};

const DEFAULT_LOCK_WAIT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum RowKey {
    Cart(u64),
    Product(ProductId),
    // Queues every create for one customer behind the first. InnoDB is
    // weaker here: with no active row it only takes gap locks, which do not
    // conflict, so concurrent first creates can end in a deadlock there.
    ActiveCart(CustomerId),
}

#[derive(Debug, Clone, Copy)]
struct CartRow {
    customer: CustomerId,
    status: CartStatus,
}

#[derive(Debug, Default)]
struct Tables {
    carts: BTreeMap<u64, CartRow>,
    items: BTreeMap<(u64, ProductId), u32>,
    products: BTreeMap<ProductId, Product>,
}

#[derive(Debug)]
struct Shared {
    tables: RwLock<Tables>,
    locks: Mutex<FxHashMap<RowKey, Arc<Mutex<()>>>>,
    next_cart: AtomicU64,
}

impl Shared {
    async fn row_lock(&self, key: RowKey) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;

        Arc::clone(locks.entry(key).or_default())
    }

    // Entries referenced only by the map have no holder and no waiter.
    fn prune_locks(&self) {
        if let Ok(mut locks) = self.locks.try_lock() {
            locks.retain(|_, row| Arc::strong_count(row) > 1);
        }
    }
}

/// Relational store held in memory.
///
/// Row locks are exclusive and held until the owning transaction commits,
/// rolls back or is dropped. Waiting longer than the lock-wait limit fails
/// with [`StoreError::LockTimeout`]. Writes are staged per transaction and
/// only become visible on commit. Cart keys come from an auto-increment
/// counter that, like a real one, is not rolled back.
#[derive(Debug, Clone)]
pub struct MemoryDatabase {
    shared: Arc<Shared>,
    lock_wait: Duration,
}

impl Default for MemoryDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDatabase {
    /// Empty database with a five second lock-wait limit.
    #[must_use]
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                tables: RwLock::new(Tables::default()),
                locks: Mutex::new(FxHashMap::default()),
                next_cart: AtomicU64::new(1),
            }),
            lock_wait: DEFAULT_LOCK_WAIT,
        }
    }

    /// Override how long a transaction waits for a row lock.
    #[must_use]
    pub fn with_lock_wait(mut self, lock_wait: Duration) -> Self {
        self.lock_wait = lock_wait;
        self
    }

    /// Add or rename a catalog product.
    pub async fn insert_product(&self, product: ProductId, name: impl Into<String>) {
        self.insert_product_record(Product::named(product, name))
            .await;
    }

    /// Add or replace a full catalog entry.
    pub async fn insert_product_record(&self, product: Product) {
        self.shared
            .tables
            .write()
            .await
            .products
            .insert(product.id, product);
    }

    /// Move a committed cart to another status.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Constraint`] when the cart does not exist.
    pub async fn set_status(&self, cart: u64, status: CartStatus) -> Result<(), StoreError> {
        let mut tables = self.shared.tables.write().await;

        let row = tables
            .carts
            .get_mut(&cart)
            .ok_or_else(|| StoreError::Constraint(format!("cart {cart} does not exist")))?;

        row.status = status;

        Ok(())
    }

    /// Number of committed item rows across all carts.
    pub async fn item_count(&self) -> usize {
        self.shared.tables.read().await.items.len()
    }

    #[cfg(test)]
    async fn lock_entries(&self) -> usize {
        self.shared.locks.lock().await.len()
    }
}

#[async_trait]
impl RelationalBackend for MemoryDatabase {
    type Tx = MemoryTransaction;

    async fn begin(&self) -> Result<Self::Tx, StoreError> {
        Ok(MemoryTransaction {
            shared: Arc::clone(&self.shared),
            lock_wait: self.lock_wait,
            held: FxHashSet::default(),
            guards: Vec::new(),
            writes: Vec::new(),
        })
    }

    async fn fetch_cart(&self, cart: u64) -> Result<Option<Cart>, StoreError> {
        let tables = self.shared.tables.read().await;

        let Some(row) = tables.carts.get(&cart) else {
            return Ok(None);
        };

        let items = tables
            .items
            .range((cart, ProductId::new(0))..=(cart, ProductId::new(u32::MAX)))
            .map(|((_, product), quantity)| CartItem {
                product_id: *product,
                product_name: tables
                    .products
                    .get(product)
                    .map(|entry| entry.name.clone())
                    .unwrap_or_default(),
                quantity: *quantity,
            })
            .collect();

        Ok(Some(Cart {
            id: CartId::Sequential(cart),
            customer_id: row.customer,
            status: row.status,
            items,
        }))
    }

    async fn purge(&self) -> Result<(), StoreError> {
        let mut tables = self.shared.tables.write().await;

        tables.items.clear();
        tables.carts.clear();

        Ok(())
    }
}

#[async_trait]
impl CatalogBackend for MemoryDatabase {
    async fn fetch_product(&self, product: ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.shared.tables.read().await.products.get(&product).cloned())
    }

    async fn update_product(&self, product: &Product) -> Result<bool, StoreError> {
        let mut tx = self.begin().await?;

        tx.acquire(RowKey::Product(product.id)).await?;

        let mut tables = self.shared.tables.write().await;

        let Some(entry) = tables.products.get_mut(&product.id) else {
            return Ok(false);
        };

        entry.clone_from(product);

        Ok(true)
    }

    async fn count_products(&self) -> Result<u64, StoreError> {
        let count = self.shared.tables.read().await.products.len();

        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }

    async fn product_window(&self, offset: u64, limit: u64) -> Result<Vec<Product>, StoreError> {
        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);

        Ok(self
            .shared
            .tables
            .read()
            .await
            .products
            .values()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }
}

#[derive(Debug)]
enum StagedWrite {
    Cart { key: u64, customer: CustomerId },
    Item { cart: u64, item: ItemUpdate },
}

/// Transaction over a [`MemoryDatabase`].
#[derive(Debug)]
pub struct MemoryTransaction {
    shared: Arc<Shared>,
    lock_wait: Duration,
    held: FxHashSet<RowKey>,
    guards: Vec<OwnedMutexGuard<()>>,
    writes: Vec<StagedWrite>,
}

impl MemoryTransaction {
    async fn acquire(&mut self, key: RowKey) -> Result<(), StoreError> {
        if self.held.contains(&key) {
            return Ok(());
        }

        let row = self.shared.row_lock(key).await;

        let guard = timeout(self.lock_wait, row.lock_owned())
            .await
            .map_err(|_elapsed| StoreError::LockTimeout)?;

        self.held.insert(key);
        self.guards.push(guard);

        Ok(())
    }

    fn staged_cart(&self, cart: u64) -> bool {
        self.writes
            .iter()
            .any(|write| matches!(write, StagedWrite::Cart { key, .. } if *key == cart))
    }
}

#[async_trait]
impl RelationalTransaction for MemoryTransaction {
    async fn lock_active_cart(&mut self, customer: CustomerId) -> Result<Option<u64>, StoreError> {
        self.acquire(RowKey::ActiveCart(customer)).await?;

        let existing = self
            .shared
            .tables
            .read()
            .await
            .carts
            .iter()
            .find(|(_, row)| row.customer == customer && row.status == CartStatus::Active)
            .map(|(key, _)| *key);

        if let Some(key) = existing {
            self.acquire(RowKey::Cart(key)).await?;
        }

        Ok(existing)
    }

    async fn insert_cart(&mut self, customer: CustomerId) -> Result<u64, StoreError> {
        let key = self.shared.next_cart.fetch_add(1, Ordering::SeqCst);

        self.acquire(RowKey::Cart(key)).await?;
        self.writes.push(StagedWrite::Cart { key, customer });

        Ok(key)
    }

    async fn lock_cart(&mut self, cart: u64) -> Result<bool, StoreError> {
        self.acquire(RowKey::Cart(cart)).await?;

        if self.staged_cart(cart) {
            return Ok(true);
        }

        Ok(self.shared.tables.read().await.carts.contains_key(&cart))
    }

    async fn lock_products(&mut self, products: &[ProductId]) -> Result<Vec<ProductId>, StoreError> {
        let existing: Vec<ProductId> = {
            let tables = self.shared.tables.read().await;

            products
                .iter()
                .copied()
                .filter(|product| tables.products.contains_key(product))
                .collect()
        };

        for product in &existing {
            self.acquire(RowKey::Product(*product)).await?;
        }

        Ok(existing)
    }

    async fn upsert_item(&mut self, cart: u64, item: &ItemUpdate) -> Result<(), StoreError> {
        if item.quantity == 0 {
            return Err(StoreError::Constraint(
                "cart_item.quantity must be greater than 0".to_owned(),
            ));
        }

        {
            let tables = self.shared.tables.read().await;

            if !tables.carts.contains_key(&cart) && !self.staged_cart(cart) {
                return Err(StoreError::Constraint(format!(
                    "cart_item.cart_id {cart} references a missing cart"
                )));
            }

            if !tables.products.contains_key(&item.product_id) {
                return Err(StoreError::Constraint(format!(
                    "cart_item.product_id {} references a missing product",
                    item.product_id
                )));
            }
        }

        self.writes.push(StagedWrite::Item { cart, item: *item });

        Ok(())
    }

    async fn commit(mut self) -> Result<(), StoreError> {
        let writes = std::mem::take(&mut self.writes);
        let mut tables = self.shared.tables.write().await;

        for write in writes {
            match write {
                StagedWrite::Cart { key, customer } => {
                    tables.carts.insert(
                        key,
                        CartRow {
                            customer,
                            status: CartStatus::Active,
                        },
                    );
                }
                StagedWrite::Item { cart, item } => {
                    tables
                        .items
                        .insert((cart, item.product_id), item.quantity);
                }
            }
        }

        Ok(())
    }

    async fn rollback(self) -> Result<(), StoreError> {
        Ok(())
    }
}

impl Drop for MemoryTransaction {
    fn drop(&mut self) {
        self.guards.clear();
        self.shared.prune_locks();
    }
}
