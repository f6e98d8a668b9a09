//! Products Repository

use sqlx::{
    FromRow, MySql, MySqlPool, QueryBuilder, Row, Transaction, mysql::MySqlRow, query, query_as,
    query_scalar,
};

use carts::prelude::{Product, ProductId};

const LOCK_PRODUCTS_SQL: &str = include_str!("../sql/lock_products.sql");
const GET_PRODUCT_SQL: &str = include_str!("../sql/get_product.sql");
const LOCK_PRODUCT_SQL: &str = include_str!("../sql/lock_product.sql");
const UPDATE_PRODUCT_SQL: &str = include_str!("../sql/update_product.sql");
const COUNT_PRODUCTS_SQL: &str = include_str!("../sql/count_products.sql");
const PRODUCT_WINDOW_SQL: &str = include_str!("../sql/product_window.sql");

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct MySqlProductsRepository;

impl MySqlProductsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Lock the listed product rows in key order, returning the ids found.
    pub(crate) async fn lock_products(
        &self,
        tx: &mut Transaction<'_, MySql>,
        products: &[ProductId],
    ) -> Result<Vec<ProductId>, sqlx::Error> {
        if products.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder = QueryBuilder::<MySql>::new(LOCK_PRODUCTS_SQL);

        builder.push(" (");

        let mut ids = builder.separated(", ");

        for product in products {
            ids.push_bind(product.get());
        }

        builder.push(") ORDER BY product_id FOR UPDATE");

        let found: Vec<u32> = builder
            .build_query_scalar::<u32>()
            .fetch_all(&mut **tx)
            .await?;

        Ok(found.into_iter().map(ProductId::new).collect())
    }

    pub(crate) async fn get_product(
        &self,
        pool: &MySqlPool,
        product: ProductId,
    ) -> Result<Option<Product>, sqlx::Error> {
        let row = query_as::<MySql, ProductRow>(GET_PRODUCT_SQL)
            .bind(product.get())
            .fetch_optional(pool)
            .await?;

        Ok(row.map(Into::into))
    }

    pub(crate) async fn lock_product(
        &self,
        tx: &mut Transaction<'_, MySql>,
        product: ProductId,
    ) -> Result<bool, sqlx::Error> {
        let found = query_scalar::<MySql, u32>(LOCK_PRODUCT_SQL)
            .bind(product.get())
            .fetch_optional(&mut **tx)
            .await?;

        Ok(found.is_some())
    }

    pub(crate) async fn update_product(
        &self,
        tx: &mut Transaction<'_, MySql>,
        product: &Product,
    ) -> Result<(), sqlx::Error> {
        query(UPDATE_PRODUCT_SQL)
            .bind(&product.name)
            .bind(&product.category)
            .bind(&product.brand)
            .bind(&product.description)
            .bind(product.id.get())
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub(crate) async fn count_products(&self, pool: &MySqlPool) -> Result<i64, sqlx::Error> {
        query_scalar::<MySql, i64>(COUNT_PRODUCTS_SQL)
            .fetch_one(pool)
            .await
    }

    pub(crate) async fn product_window(
        &self,
        pool: &MySqlPool,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Product>, sqlx::Error> {
        let rows = query_as::<MySql, ProductRow>(PRODUCT_WINDOW_SQL)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[derive(Debug, Clone)]
struct ProductRow {
    product_id: u32,
    name: String,
    category: String,
    brand: String,
    description: String,
}

impl<'r> FromRow<'r, MySqlRow> for ProductRow {
    fn from_row(row: &'r MySqlRow) -> sqlx::Result<Self> {
        Ok(Self {
            product_id: row.try_get("product_id")?,
            name: row.try_get("name")?,
            category: row.try_get("category")?,
            brand: row.try_get("brand")?,
            description: row.try_get("description")?,
        })
    }
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: ProductId::new(row.product_id),
            name: row.name,
            category: row.category,
            brand: row.brand,
            description: row.description,
        }
    }
}
