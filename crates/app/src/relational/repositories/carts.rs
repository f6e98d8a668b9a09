//! Carts Repository

use sqlx::{FromRow, MySql, MySqlPool, Row, Transaction, mysql::MySqlRow, query, query_as, query_scalar};

use carts::prelude::{Cart, CartId, CartItem, CartStatus, CustomerId, ProductId};

const LOCK_ACTIVE_CART_SQL: &str = include_str!("../sql/lock_active_cart.sql");
const CREATE_CART_SQL: &str = include_str!("../sql/create_cart.sql");
const LOCK_CART_SQL: &str = include_str!("../sql/lock_cart.sql");
const GET_CART_SQL: &str = include_str!("../sql/get_cart.sql");
const DELETE_CARTS_SQL: &str = include_str!("../sql/delete_carts.sql");

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct MySqlCartsRepository;

impl MySqlCartsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn lock_active_cart(
        &self,
        tx: &mut Transaction<'_, MySql>,
        customer: CustomerId,
    ) -> Result<Option<u64>, sqlx::Error> {
        query_scalar::<MySql, u64>(LOCK_ACTIVE_CART_SQL)
            .bind(customer.get())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn create_cart(
        &self,
        tx: &mut Transaction<'_, MySql>,
        customer: CustomerId,
    ) -> Result<u64, sqlx::Error> {
        let result = query(CREATE_CART_SQL)
            .bind(customer.get())
            .execute(&mut **tx)
            .await?;

        Ok(result.last_insert_id())
    }

    pub(crate) async fn lock_cart(
        &self,
        tx: &mut Transaction<'_, MySql>,
        cart: u64,
    ) -> Result<bool, sqlx::Error> {
        let found = query_scalar::<MySql, u64>(LOCK_CART_SQL)
            .bind(cart)
            .fetch_optional(&mut **tx)
            .await?;

        Ok(found.is_some())
    }

    /// One row per item, or a single row with null item columns for an empty
    /// cart.
    pub(crate) async fn get_cart(
        &self,
        pool: &MySqlPool,
        cart: u64,
    ) -> Result<Vec<CartRow>, sqlx::Error> {
        query_as::<MySql, CartRow>(GET_CART_SQL)
            .bind(cart)
            .fetch_all(pool)
            .await
    }

    pub(crate) async fn delete_carts(
        &self,
        tx: &mut Transaction<'_, MySql>,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_CARTS_SQL)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

/// A cart joined with at most one of its items.
#[derive(Debug, Clone)]
pub(crate) struct CartRow {
    cart_id: u64,
    customer_id: u64,
    status: CartStatus,
    item: Option<CartItem>,
}

impl CartRow {
    /// Fold joined rows back into a cart. `None` when there are no rows.
    pub(crate) fn fold(rows: Vec<Self>) -> Option<Cart> {
        let mut rows = rows.into_iter();
        let first = rows.next()?;

        let mut items: Vec<CartItem> = first.item.into_iter().collect();
        items.extend(rows.filter_map(|row| row.item));

        Some(Cart {
            id: CartId::Sequential(first.cart_id),
            customer_id: CustomerId::new(first.customer_id),
            status: first.status,
            items,
        })
    }
}

impl<'r> FromRow<'r, MySqlRow> for CartRow {
    fn from_row(row: &'r MySqlRow) -> sqlx::Result<Self> {
        let status: String = row.try_get("status")?;

        let status = status
            .parse::<CartStatus>()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "status".to_string(),
                source: Box::new(e),
            })?;

        let product_id: Option<u32> = row.try_get("product_id")?;

        let item = match product_id {
            Some(product_id) => Some(CartItem {
                product_id: ProductId::new(product_id),
                product_name: row
                    .try_get::<Option<String>, _>("product_name")?
                    .unwrap_or_default(),
                quantity: row.try_get("quantity")?,
            }),
            None => None,
        };

        Ok(Self {
            cart_id: row.try_get("cart_id")?,
            customer_id: row.try_get("customer_id")?,
            status,
            item,
        })
    }
}
