//! Integration tests for the transactional cart store

use std::{sync::Arc, time::Duration};

use testresult::TestResult;

use carts::prelude::*;

const CUSTOMER: CustomerId = CustomerId::new(42);

fn product(id: u32) -> ProductId {
    ProductId::new(id)
}

fn update(id: u32, quantity: u32) -> ItemUpdate {
    ItemUpdate::new(product(id), quantity)
}

async fn engine_with_catalog(
    products: &[(u32, &str)],
) -> (MemoryDatabase, CartEngine<TransactionalStore<MemoryDatabase>>) {
    let db = MemoryDatabase::new();

    for (id, name) in products {
        db.insert_product(product(*id), *name).await;
    }

    (db.clone(), CartEngine::new(TransactionalStore::new(db)))
}

fn quantities(cart: &Cart) -> Vec<(u32, u32)> {
    cart.items
        .iter()
        .map(|item| (item.product_id.get(), item.quantity))
        .collect()
}

#[tokio::test]
async fn created_cart_is_active_and_empty() -> TestResult {
    let (_db, engine) = engine_with_catalog(&[]).await;
    let ctx = OpContext::new();

    let created = engine.create_cart(&ctx, CUSTOMER).await?;
    let cart = engine.get_cart(&ctx, &created.id.to_string()).await?;

    assert_eq!(created.status, CartStatus::Active);
    assert!(matches!(created.id, CartId::Sequential(_)));
    assert_eq!(cart.id, created.id);
    assert_eq!(cart.customer_id, CUSTOMER);
    assert_eq!(cart.status, CartStatus::Active);
    assert!(cart.items.is_empty());

    Ok(())
}

#[tokio::test]
async fn second_active_cart_for_customer_is_rejected() -> TestResult {
    let (_db, engine) = engine_with_catalog(&[]).await;
    let ctx = OpContext::new();

    let first = engine.create_cart(&ctx, CUSTOMER).await?;
    let second = engine.create_cart(&ctx, CUSTOMER).await;

    assert!(
        matches!(
            second,
            Err(CartError::DuplicateActiveCart { customer, existing })
                if customer == CUSTOMER && existing == first.id
        ),
        "expected DuplicateActiveCart, got {second:?}"
    );

    let cart = engine.get_cart(&ctx, &first.id.to_string()).await?;

    assert_eq!(cart.status, CartStatus::Active);

    Ok(())
}

#[tokio::test]
async fn customer_can_open_a_new_cart_once_the_old_one_is_ordered() -> TestResult {
    let (db, engine) = engine_with_catalog(&[]).await;
    let ctx = OpContext::new();

    let first = engine.create_cart(&ctx, CUSTOMER).await?;

    let CartId::Sequential(key) = first.id else {
        return Err("expected a sequential id".into());
    };

    db.set_status(key, CartStatus::Ordered).await?;

    let second = engine.create_cart(&ctx, CUSTOMER).await?;

    assert_ne!(first.id, second.id);

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_for_one_customer_yield_one_cart() -> TestResult {
    let (_db, engine) = engine_with_catalog(&[]).await;
    let engine = Arc::new(engine);

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let engine = Arc::clone(&engine);

            tokio::spawn(async move { engine.create_cart(&OpContext::new(), CUSTOMER).await })
        })
        .collect();

    let mut created = 0;
    let mut rejected = 0;

    for task in tasks {
        match task.await? {
            Ok(_) => created += 1,
            Err(CartError::DuplicateActiveCart { .. }) => rejected += 1,
            Err(other) => return Err(other.into()),
        }
    }

    assert_eq!(created, 1, "exactly one create should win");
    assert_eq!(rejected, 7);

    Ok(())
}

#[tokio::test]
async fn zero_customer_is_invalid_input() {
    let (_db, engine) = engine_with_catalog(&[]).await;

    let result = engine
        .create_cart(&OpContext::new(), CustomerId::new(0))
        .await;

    assert!(
        matches!(result, Err(CartError::InvalidInput(_))),
        "expected InvalidInput, got {result:?}"
    );
}

#[tokio::test]
async fn zero_quantities_are_dropped_from_the_batch() -> TestResult {
    let (_db, engine) = engine_with_catalog(&[(1, "Kettle"), (2, "Toaster")]).await;
    let ctx = OpContext::new();

    let cart = engine.create_cart(&ctx, CUSTOMER).await?.id.to_string();
    let outcome = engine
        .update_items(&ctx, &cart, vec![update(1, 3), update(2, 0)])
        .await?;

    let stored = engine.get_cart(&ctx, &cart).await?;

    assert_eq!(outcome.applied, 1);
    assert_eq!(quantities(&stored), vec![(1, 3)]);
    assert_eq!(
        stored.items.first().map(|item| item.product_name.as_str()),
        Some("Kettle")
    );

    Ok(())
}

#[tokio::test]
async fn zero_quantity_never_deletes_an_existing_item() -> TestResult {
    let (_db, engine) = engine_with_catalog(&[(1, "Kettle")]).await;
    let ctx = OpContext::new();

    let cart = engine.create_cart(&ctx, CUSTOMER).await?.id.to_string();
    engine.update_items(&ctx, &cart, vec![update(1, 4)]).await?;

    let outcome = engine.update_items(&ctx, &cart, vec![update(1, 0)]).await?;
    let stored = engine.get_cart(&ctx, &cart).await?;

    assert_eq!(outcome.applied, 0);
    assert_eq!(quantities(&stored), vec![(1, 4)]);

    Ok(())
}

#[tokio::test]
async fn duplicate_products_are_rejected_before_any_write() -> TestResult {
    let (db, engine) = engine_with_catalog(&[(5, "Chair")]).await;
    let ctx = OpContext::new();

    let cart = engine.create_cart(&ctx, CUSTOMER).await?.id.to_string();
    let result = engine
        .update_items(&ctx, &cart, vec![update(5, 1), update(5, 2)])
        .await;

    assert!(
        matches!(
            result,
            Err(CartError::DuplicateProductInRequest(ref ids)) if ids == &[product(5)]
        ),
        "expected DuplicateProductInRequest([5]), got {result:?}"
    );
    assert_eq!(db.item_count().await, 0);

    Ok(())
}

#[tokio::test]
async fn missing_product_rolls_back_the_whole_batch() -> TestResult {
    let (db, engine) = engine_with_catalog(&[(1, "Kettle"), (2, "Toaster")]).await;
    let ctx = OpContext::new();

    let cart = engine.create_cart(&ctx, CUSTOMER).await?.id.to_string();
    let result = engine
        .update_items(
            &ctx,
            &cart,
            vec![update(1, 2), update(99, 1), update(2, 1), update(98, 4)],
        )
        .await;

    assert!(
        matches!(
            result,
            Err(CartError::ProductNotFound(ref ids)) if ids == &[product(98), product(99)]
        ),
        "expected ProductNotFound([98, 99]), got {result:?}"
    );
    assert_eq!(db.item_count().await, 0);

    Ok(())
}

#[tokio::test]
async fn reapplying_a_batch_is_idempotent() -> TestResult {
    let (_db, engine) = engine_with_catalog(&[(1, "Kettle"), (2, "Toaster")]).await;
    let ctx = OpContext::new();

    let cart = engine.create_cart(&ctx, CUSTOMER).await?.id.to_string();
    let batch = vec![update(1, 3), update(2, 1)];

    engine.update_items(&ctx, &cart, batch.clone()).await?;
    let once = engine.get_cart(&ctx, &cart).await?;

    engine.update_items(&ctx, &cart, batch).await?;
    let twice = engine.get_cart(&ctx, &cart).await?;

    assert_eq!(once, twice);

    engine.update_items(&ctx, &cart, vec![update(2, 6)]).await?;
    let overwritten = engine.get_cart(&ctx, &cart).await?;

    assert_eq!(quantities(&overwritten), vec![(1, 3), (2, 6)]);

    Ok(())
}

#[tokio::test]
async fn updating_an_unknown_cart_is_not_found() -> TestResult {
    let (_db, engine) = engine_with_catalog(&[(1, "Kettle")]).await;

    let result = engine
        .update_items(&OpContext::new(), "404", vec![update(1, 1)])
        .await;

    assert!(
        matches!(result, Err(CartError::CartNotFound(CartId::Sequential(404)))),
        "expected CartNotFound, got {result:?}"
    );

    Ok(())
}

#[tokio::test]
async fn malformed_cart_ids_are_invalid_input() {
    let (_db, engine) = engine_with_catalog(&[]).await;
    let ctx = OpContext::new();

    for raw in ["0", "-1", "abc", "6f1c1a3e-2b0d-4c1e-9d55-0a3f4b7c8e21"] {
        let result = engine.get_cart(&ctx, raw).await;

        assert!(
            matches!(result, Err(CartError::InvalidInput(_))),
            "expected InvalidInput for {raw:?}, got {result:?}"
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_batches_on_one_cart_never_interleave() -> TestResult {
    let (_db, engine) = engine_with_catalog(&[(1, "Kettle"), (2, "Toaster"), (3, "Mug")]).await;
    let engine = Arc::new(engine);
    let ctx = OpContext::new();

    let cart = engine.create_cart(&ctx, CUSTOMER).await?.id.to_string();

    let tasks: Vec<_> = (1..=8)
        .map(|quantity| {
            let engine = Arc::clone(&engine);
            let cart = cart.clone();

            tokio::spawn(async move {
                engine
                    .update_items(
                        &OpContext::new(),
                        &cart,
                        vec![update(1, quantity), update(2, quantity), update(3, quantity)],
                    )
                    .await
            })
        })
        .collect();

    for task in tasks {
        task.await??;
    }

    let stored = engine.get_cart(&ctx, &cart).await?;
    let first = stored.items.first().map(|item| item.quantity);

    assert_eq!(stored.items.len(), 3);
    assert!(
        stored.items.iter().all(|item| Some(item.quantity) == first),
        "every item should come from the same batch: {stored:?}"
    );

    Ok(())
}

#[tokio::test]
async fn lock_wait_timeout_surfaces_as_store_error() -> TestResult {
    let db = MemoryDatabase::new().with_lock_wait(Duration::from_millis(20));
    db.insert_product(product(1), "Kettle").await;

    let engine = CartEngine::new(TransactionalStore::new(db.clone()));
    let ctx = OpContext::new();

    let created = engine.create_cart(&ctx, CUSTOMER).await?;
    let CartId::Sequential(key) = created.id else {
        return Err("expected a sequential id".into());
    };

    let mut holder = db.begin().await?;
    holder.lock_cart(key).await?;

    let result = engine
        .update_items(&ctx, &key.to_string(), vec![update(1, 1)])
        .await;

    assert!(
        matches!(result, Err(CartError::Store(StoreError::LockTimeout))),
        "expected LockTimeout, got {result:?}"
    );

    holder.rollback().await?;

    engine
        .update_items(&ctx, &key.to_string(), vec![update(1, 1)])
        .await?;

    Ok(())
}

#[tokio::test]
async fn cancelling_a_blocked_update_aborts_it() -> TestResult {
    let (db, engine) = engine_with_catalog(&[(1, "Kettle")]).await;
    let setup = OpContext::new();

    let created = engine.create_cart(&setup, CUSTOMER).await?;
    let CartId::Sequential(key) = created.id else {
        return Err("expected a sequential id".into());
    };

    let mut holder = db.begin().await?;
    holder.lock_cart(key).await?;

    let ctx = OpContext::new();
    let token = ctx.cancellation_token().clone();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        token.cancel();
    });

    let result = engine
        .update_items(&ctx, &key.to_string(), vec![update(1, 1)])
        .await;

    assert!(
        matches!(result, Err(CartError::Store(StoreError::Cancelled))),
        "expected Cancelled, got {result:?}"
    );

    holder.rollback().await?;

    assert_eq!(db.item_count().await, 0);

    Ok(())
}

#[tokio::test]
async fn deadline_aborts_a_blocked_create() -> TestResult {
    let (db, engine) = engine_with_catalog(&[]).await;

    let mut holder = db.begin().await?;
    holder.lock_active_cart(CUSTOMER).await?;

    let ctx = OpContext::new().with_timeout(Duration::from_millis(20));
    let result = engine.create_cart(&ctx, CUSTOMER).await;

    assert!(
        matches!(result, Err(CartError::Store(StoreError::DeadlineExceeded))),
        "expected DeadlineExceeded, got {result:?}"
    );

    holder.rollback().await?;

    engine.create_cart(&OpContext::new(), CUSTOMER).await?;

    Ok(())
}

#[tokio::test]
async fn clearing_removes_every_cart() -> TestResult {
    let (db, engine) = engine_with_catalog(&[(1, "Kettle")]).await;
    let ctx = OpContext::new();

    let cart = engine.create_cart(&ctx, CUSTOMER).await?.id.to_string();
    engine.update_items(&ctx, &cart, vec![update(1, 2)]).await?;

    engine.clear_carts(&ctx).await?;

    let result = engine.get_cart(&ctx, &cart).await;

    assert!(
        matches!(result, Err(CartError::CartNotFound(_))),
        "expected CartNotFound, got {result:?}"
    );
    assert_eq!(db.item_count().await, 0);

    engine.create_cart(&ctx, CUSTOMER).await?;

    Ok(())
}

#[test]
fn transactional_store_declares_its_guarantees() {
    let store = TransactionalStore::new(MemoryDatabase::new());

    assert_eq!(
        store.capabilities(),
        StoreCapabilities {
            supports_atomic_batch: true,
            enforces_single_active_cart: true,
            validates_references: true,
        }
    );
}
