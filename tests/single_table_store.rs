//! Integration tests for the conditional single-table cart store

use std::sync::Arc;

use async_trait::async_trait;
use testresult::TestResult;
use uuid::Uuid;

use carts::{prelude::*, store::records};

const CUSTOMER: CustomerId = CustomerId::new(42);

#[derive(Debug)]
struct FixedTokens(Uuid);

impl IdentityAllocator for FixedTokens {
    fn allocate(&self) -> Uuid {
        self.0
    }
}

#[derive(Debug)]
struct Catalog(Vec<(ProductId, &'static str)>);

#[async_trait]
impl ProductOracle for Catalog {
    async fn resolve(
        &self,
        _ctx: &OpContext,
        products: &[ProductId],
    ) -> Result<ProductNames, StoreError> {
        Ok(self
            .0
            .iter()
            .filter(|(id, _)| products.contains(id))
            .map(|(id, name)| (*id, (*name).to_owned()))
            .collect())
    }
}

fn update(id: u32, quantity: u32) -> ItemUpdate {
    ItemUpdate::new(ProductId::new(id), quantity)
}

fn engine() -> (MemoryTable, CartEngine<ConditionalStore<MemoryTable>>) {
    let table = MemoryTable::new();

    (table.clone(), CartEngine::new(ConditionalStore::new(table)))
}

fn quantities(cart: &Cart) -> Vec<(u32, u32)> {
    cart.items
        .iter()
        .map(|item| (item.product_id.get(), item.quantity))
        .collect()
}

#[tokio::test]
async fn created_cart_is_active_and_empty() -> TestResult {
    let (table, engine) = engine();
    let ctx = OpContext::new();

    let created = engine.create_cart(&ctx, CUSTOMER).await?;
    let cart = engine.get_cart(&ctx, &created.id.to_string()).await?;

    assert!(matches!(created.id, CartId::Token(_)));
    assert_eq!(created.status, CartStatus::Active);
    assert_eq!(cart.customer_id, CUSTOMER);
    assert_eq!(cart.status, CartStatus::Active);
    assert!(cart.items.is_empty());
    assert_eq!(table.len().await, 1);

    Ok(())
}

#[tokio::test]
async fn customer_may_own_several_active_carts() -> TestResult {
    let (_table, engine) = engine();
    let ctx = OpContext::new();

    let first = engine.create_cart(&ctx, CUSTOMER).await?;
    let second = engine.create_cart(&ctx, CUSTOMER).await?;

    assert_ne!(first.id, second.id);
    assert!(!engine.capabilities().enforces_single_active_cart);

    Ok(())
}

#[tokio::test]
async fn zero_quantities_are_dropped_and_names_are_synthetic() -> TestResult {
    let (_table, engine) = engine();
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
        Some("Widget #1")
    );

    Ok(())
}

#[tokio::test]
async fn all_zero_batch_touches_nothing() -> TestResult {
    let (table, engine) = engine();
    let ctx = OpContext::new();

    let cart = engine.create_cart(&ctx, CUSTOMER).await?.id.to_string();
    let outcome = engine
        .update_items(&ctx, &cart, vec![update(1, 0), update(2, 0)])
        .await?;

    assert_eq!(outcome.applied, 0);
    assert_eq!(table.len().await, 1);

    Ok(())
}

#[tokio::test]
async fn duplicate_products_are_rejected_before_any_write() -> TestResult {
    let (table, engine) = engine();
    let ctx = OpContext::new();

    let cart = engine.create_cart(&ctx, CUSTOMER).await?.id.to_string();
    let result = engine
        .update_items(&ctx, &cart, vec![update(5, 1), update(5, 2)])
        .await;

    assert!(
        matches!(
            result,
            Err(CartError::DuplicateProductInRequest(ref ids)) if ids == &[ProductId::new(5)]
        ),
        "expected DuplicateProductInRequest([5]), got {result:?}"
    );
    assert_eq!(table.len().await, 1);

    Ok(())
}

#[tokio::test]
async fn reapplying_a_batch_overwrites_quantities() -> TestResult {
    let (_table, engine) = engine();
    let ctx = OpContext::new();

    let cart = engine.create_cart(&ctx, CUSTOMER).await?.id.to_string();

    engine
        .update_items(&ctx, &cart, vec![update(1, 3), update(4, 2)])
        .await?;
    engine
        .update_items(&ctx, &cart, vec![update(1, 3), update(4, 2)])
        .await?;
    engine.update_items(&ctx, &cart, vec![update(1, 7)]).await?;

    let stored = engine.get_cart(&ctx, &cart).await?;

    assert_eq!(quantities(&stored), vec![(1, 7), (4, 2)]);

    Ok(())
}

#[tokio::test]
async fn unknown_cart_is_not_found() {
    let (_table, engine) = engine();

    let result = engine
        .get_cart(&OpContext::new(), &Uuid::new_v4().to_string())
        .await;

    assert!(
        matches!(result, Err(CartError::CartNotFound(CartId::Token(_)))),
        "expected CartNotFound, got {result:?}"
    );
}

#[tokio::test]
async fn non_token_cart_ids_are_invalid_input() {
    let (_table, engine) = engine();

    let result = engine.get_cart(&OpContext::new(), "17").await;

    assert!(
        matches!(result, Err(CartError::InvalidInput(_))),
        "expected InvalidInput, got {result:?}"
    );
}

#[tokio::test]
async fn items_written_to_a_missing_cart_read_back_as_corrupted() -> TestResult {
    let (_table, engine) = engine();
    let ctx = OpContext::new();
    let cart = Uuid::new_v4().to_string();

    engine.update_items(&ctx, &cart, vec![update(1, 1)]).await?;

    let result = engine.get_cart(&ctx, &cart).await;

    assert!(
        matches!(result, Err(CartError::CorruptedCart(_))),
        "expected CorruptedCart, got {result:?}"
    );

    Ok(())
}

#[tokio::test]
async fn deleted_metadata_is_reported_as_corrupted() -> TestResult {
    let (table, engine) = engine();
    let ctx = OpContext::new();

    let created = engine.create_cart(&ctx, CUSTOMER).await?;
    let cart = created.id.to_string();

    engine.update_items(&ctx, &cart, vec![update(3, 1)]).await?;

    let CartId::Token(token) = created.id else {
        return Err("expected a cart token".into());
    };

    table
        .delete(&records::cart_partition(token), records::CART_SORT_KEY)
        .await;

    let result = engine.get_cart(&ctx, &cart).await;

    assert!(
        matches!(result, Err(CartError::CorruptedCart(id)) if id == created.id),
        "expected CorruptedCart, got {result:?}"
    );

    Ok(())
}

#[tokio::test]
async fn identity_collision_is_a_store_error() -> TestResult {
    let table = MemoryTable::new();
    let engine = CartEngine::new(
        ConditionalStore::new(table.clone()).with_allocator(Arc::new(FixedTokens(Uuid::nil()))),
    );
    let ctx = OpContext::new();

    engine.create_cart(&ctx, CUSTOMER).await?;
    let result = engine.create_cart(&ctx, CustomerId::new(7)).await;

    assert!(
        matches!(result, Err(CartError::Store(StoreError::ConditionFailed(_)))),
        "expected ConditionFailed, got {result:?}"
    );

    let cart = engine.get_cart(&ctx, &Uuid::nil().to_string()).await?;

    assert_eq!(cart.customer_id, CUSTOMER);

    Ok(())
}

#[tokio::test]
async fn failed_batch_may_be_partially_applied() -> TestResult {
    let (table, engine) = engine();
    let ctx = OpContext::new();

    let cart = engine.create_cart(&ctx, CUSTOMER).await?.id.to_string();

    table.fail_next_batch_after(1).await;

    let result = engine
        .update_items(&ctx, &cart, vec![update(1, 1), update(2, 2), update(3, 3)])
        .await;

    assert!(
        matches!(
            result,
            Err(CartError::Store(StoreError::Unprocessed { unprocessed: 2 }))
        ),
        "expected two unprocessed records, got {result:?}"
    );

    let stored = engine.get_cart(&ctx, &cart).await?;

    assert_eq!(quantities(&stored), vec![(1, 1)]);
    assert!(!engine.capabilities().supports_atomic_batch);

    Ok(())
}

#[tokio::test]
async fn unknown_products_from_a_real_oracle_block_the_batch() -> TestResult {
    let table = MemoryTable::new();
    let catalog = Catalog(vec![(ProductId::new(1), "Kettle")]);
    let engine = CartEngine::new(ConditionalStore::new(table.clone()).with_oracle(Arc::new(catalog)));
    let ctx = OpContext::new();

    let cart = engine.create_cart(&ctx, CUSTOMER).await?.id.to_string();
    let result = engine
        .update_items(&ctx, &cart, vec![update(1, 1), update(9, 1)])
        .await;

    assert!(
        matches!(
            result,
            Err(CartError::ProductNotFound(ref ids)) if ids == &[ProductId::new(9)]
        ),
        "expected ProductNotFound([9]), got {result:?}"
    );
    assert_eq!(table.len().await, 1);

    engine.update_items(&ctx, &cart, vec![update(1, 2)]).await?;

    let stored = engine.get_cart(&ctx, &cart).await?;

    assert_eq!(
        stored.items.first().map(|item| item.product_name.as_str()),
        Some("Kettle")
    );

    Ok(())
}

#[tokio::test]
async fn cancelled_context_writes_nothing() -> TestResult {
    let (table, engine) = engine();
    let setup = OpContext::new();

    let cart = engine.create_cart(&setup, CUSTOMER).await?.id.to_string();

    let ctx = OpContext::new();
    ctx.cancellation_token().cancel();

    let result = engine.update_items(&ctx, &cart, vec![update(1, 1)]).await;

    assert!(
        matches!(result, Err(CartError::Store(StoreError::Cancelled))),
        "expected Cancelled, got {result:?}"
    );
    assert_eq!(table.len().await, 1);

    Ok(())
}

#[tokio::test]
async fn clearing_empties_the_table() -> TestResult {
    let (table, engine) = engine();
    let ctx = OpContext::new();

    let cart = engine.create_cart(&ctx, CUSTOMER).await?.id.to_string();
    engine.update_items(&ctx, &cart, vec![update(1, 1)]).await?;

    engine.clear_carts(&ctx).await?;

    assert!(table.is_empty().await);

    Ok(())
}
