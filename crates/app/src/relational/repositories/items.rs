//! Cart Items Repository

use sqlx::{MySql, Transaction, query};

use carts::prelude::ItemUpdate;

const UPSERT_CART_ITEM_SQL: &str = include_str!("../sql/upsert_cart_item.sql");
const DELETE_CART_ITEMS_SQL: &str = include_str!("../sql/delete_cart_items.sql");

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct MySqlItemsRepository;

impl MySqlItemsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn upsert_item(
        &self,
        tx: &mut Transaction<'_, MySql>,
        cart: u64,
        item: &ItemUpdate,
    ) -> Result<(), sqlx::Error> {
        query(UPSERT_CART_ITEM_SQL)
            .bind(cart)
            .bind(item.product_id.get())
            .bind(item.quantity)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub(crate) async fn delete_items(
        &self,
        tx: &mut Transaction<'_, MySql>,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_CART_ITEMS_SQL)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}
