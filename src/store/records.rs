//! Single-table record layout
//!
//! A cart lives in one partition `CART#<cart_id>`. The partition holds one
//! metadata record (`SK=CART`) and one record per product (`SK=ITEM#<id>`).
//! The metadata record also carries `GSI1PK=CUST#<customer_id>` so carts can
//! be listed per customer from a secondary index.

use std::collections::BTreeMap;

use uuid::Uuid;

use crate::{
    errors::{CartError, StoreError},
    ids::{CartId, CustomerId, ProductId},
    models::{Cart, CartItem, CartStatus, ItemUpdate},
};

/// Partition key attribute.
pub const PK: &str = "PK";
/// Sort key attribute.
pub const SK: &str = "SK";
/// Customer index partition key attribute.
pub const GSI1PK: &str = "GSI1PK";
/// Customer index sort key attribute.
pub const GSI1SK: &str = "GSI1SK";

/// Sort key of the metadata record.
pub const CART_SORT_KEY: &str = "CART";

const CART_PREFIX: &str = "CART#";
const CUSTOMER_PREFIX: &str = "CUST#";
const ITEM_PREFIX: &str = "ITEM#";

const ATTR_CART_ID: &str = "cart_id";
const ATTR_CUSTOMER_ID: &str = "customer_id";
const ATTR_STATUS: &str = "status";
const ATTR_PRODUCT_ID: &str = "product_id";
const ATTR_QUANTITY: &str = "quantity";
const ATTR_PRODUCT_NAME: &str = "product_name";

/// Attribute value subset used by cart records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    /// String attribute.
    S(String),

    /// Number attribute, kept in its decimal string form.
    N(String),
}

/// A record: attribute name to value.
pub type Item = BTreeMap<String, AttributeValue>;

/// Partition key for `cart`.
#[must_use]
pub fn cart_partition(cart: Uuid) -> String {
    format!("{CART_PREFIX}{}", cart.hyphenated())
}

/// Sort key for an item record.
#[must_use]
pub fn item_sort_key(product: ProductId) -> String {
    format!("{ITEM_PREFIX}{product}")
}

/// Customer index partition key.
#[must_use]
pub fn customer_partition(customer: CustomerId) -> String {
    format!("{CUSTOMER_PREFIX}{customer}")
}

/// Metadata record for a new cart.
#[must_use]
pub fn cart_record(cart: Uuid, customer: CustomerId, status: CartStatus) -> Item {
    let partition = cart_partition(cart);

    Item::from([
        (PK.to_owned(), AttributeValue::S(partition.clone())),
        (SK.to_owned(), AttributeValue::S(CART_SORT_KEY.to_owned())),
        (
            GSI1PK.to_owned(),
            AttributeValue::S(customer_partition(customer)),
        ),
        (GSI1SK.to_owned(), AttributeValue::S(partition)),
        (
            ATTR_CART_ID.to_owned(),
            AttributeValue::S(cart.hyphenated().to_string()),
        ),
        (
            ATTR_CUSTOMER_ID.to_owned(),
            AttributeValue::N(customer.to_string()),
        ),
        (
            ATTR_STATUS.to_owned(),
            AttributeValue::S(status.as_str().to_owned()),
        ),
    ])
}

/// Item record for one product in `cart`.
#[must_use]
pub fn item_record(cart: Uuid, item: &ItemUpdate, product_name: &str) -> Item {
    Item::from([
        (PK.to_owned(), AttributeValue::S(cart_partition(cart))),
        (
            SK.to_owned(),
            AttributeValue::S(item_sort_key(item.product_id)),
        ),
        (
            ATTR_PRODUCT_ID.to_owned(),
            AttributeValue::N(item.product_id.to_string()),
        ),
        (
            ATTR_QUANTITY.to_owned(),
            AttributeValue::N(item.quantity.to_string()),
        ),
        (
            ATTR_PRODUCT_NAME.to_owned(),
            AttributeValue::S(product_name.to_owned()),
        ),
    ])
}

/// The `(PK, SK)` pair of a record.
///
/// # Errors
///
/// Returns [`StoreError::Malformed`] when either key is missing or not a string.
pub fn primary_key(item: &Item) -> Result<(String, String), StoreError> {
    Ok((string(item, PK)?.to_owned(), string(item, SK)?.to_owned()))
}

/// Rebuild a cart from every record in its partition.
///
/// Records with an unrecognised sort key are ignored. Items are returned in
/// product order.
///
/// # Errors
///
/// - [`CartError::CartNotFound`] when the partition is empty.
/// - [`CartError::CorruptedCart`] when items exist without a metadata record.
/// - [`CartError::Store`] when a record cannot be decoded.
pub fn decode_cart(cart: CartId, records: &[Item]) -> Result<Cart, CartError> {
    if records.is_empty() {
        return Err(CartError::CartNotFound(cart));
    }

    let mut metadata = None;
    let mut items = Vec::new();

    for record in records {
        let sort_key = string(record, SK)?;

        if sort_key == CART_SORT_KEY {
            metadata = Some((
                number::<u64>(record, ATTR_CUSTOMER_ID)?,
                string(record, ATTR_STATUS)?
                    .parse::<CartStatus>()
                    .map_err(|error| StoreError::Malformed(error.to_string()))?,
            ));
        } else if sort_key.starts_with(ITEM_PREFIX) {
            items.push(CartItem {
                product_id: ProductId::new(number(record, ATTR_PRODUCT_ID)?),
                product_name: string(record, ATTR_PRODUCT_NAME)?.to_owned(),
                quantity: number(record, ATTR_QUANTITY)?,
            });
        }
    }

    let Some((customer, status)) = metadata else {
        return Err(CartError::CorruptedCart(cart));
    };

    items.sort_by_key(|item| item.product_id);

    Ok(Cart {
        id: cart,
        customer_id: CustomerId::new(customer),
        status,
        items,
    })
}

fn string<'a>(item: &'a Item, name: &str) -> Result<&'a str, StoreError> {
    match item.get(name) {
        Some(AttributeValue::S(value)) => Ok(value),
        Some(AttributeValue::N(_)) => Err(StoreError::Malformed(format!(
            "attribute `{name}` is not a string"
        ))),
        None => Err(StoreError::Malformed(format!(
            "attribute `{name}` is missing"
        ))),
    }
}

fn number<T: std::str::FromStr>(item: &Item, name: &str) -> Result<T, StoreError> {
    match item.get(name) {
        Some(AttributeValue::N(value)) => value.parse().map_err(|_unparsable| {
            StoreError::Malformed(format!("attribute `{name}` is not a valid number"))
        }),
        Some(AttributeValue::S(_)) => Err(StoreError::Malformed(format!(
            "attribute `{name}` is not a number"
        ))),
        None => Err(StoreError::Malformed(format!(
            "attribute `{name}` is missing"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn token() -> Uuid {
        Uuid::from_u128(0x6f1c_1a3e_2b0d_4c1e_9d55_0a3f_4b7c_8e21)
    }

    #[test]
    fn metadata_record_uses_exact_key_layout() {
        let record = cart_record(token(), CustomerId::new(42), CartStatus::Active);

        let s = |value: &str| Some(AttributeValue::S(value.to_owned()));

        assert_eq!(
            record.get(PK).cloned(),
            s("CART#6f1c1a3e-2b0d-4c1e-9d55-0a3f4b7c8e21")
        );
        assert_eq!(record.get(SK).cloned(), s("CART"));
        assert_eq!(record.get(GSI1PK).cloned(), s("CUST#42"));
        assert_eq!(
            record.get(GSI1SK).cloned(),
            s("CART#6f1c1a3e-2b0d-4c1e-9d55-0a3f4b7c8e21")
        );
        assert_eq!(
            record.get("customer_id").cloned(),
            Some(AttributeValue::N("42".to_owned()))
        );
        assert_eq!(record.get("status").cloned(), s("active"));
    }

    #[test]
    fn item_record_keys_by_product() {
        let record = item_record(
            token(),
            &ItemUpdate::new(ProductId::new(7), 3),
            "Widget #7",
        );

        assert_eq!(
            record.get(SK).cloned(),
            Some(AttributeValue::S("ITEM#7".to_owned()))
        );
        assert_eq!(
            record.get("quantity").cloned(),
            Some(AttributeValue::N("3".to_owned()))
        );
    }

    #[test]
    fn decode_sorts_items_and_reads_metadata() -> TestResult {
        let cart = token();
        let records = vec![
            item_record(cart, &ItemUpdate::new(ProductId::new(9), 1), "Nine"),
            cart_record(cart, CustomerId::new(42), CartStatus::Active),
            item_record(cart, &ItemUpdate::new(ProductId::new(2), 5), "Two"),
        ];

        let decoded = decode_cart(CartId::Token(cart), &records)?;

        assert_eq!(decoded.customer_id, CustomerId::new(42));
        assert_eq!(decoded.status, CartStatus::Active);
        assert_eq!(
            decoded
                .items
                .iter()
                .map(|item| (item.product_id.get(), item.quantity))
                .collect::<Vec<_>>(),
            vec![(2, 5), (9, 1)]
        );

        Ok(())
    }

    #[test]
    fn empty_partition_is_not_found() {
        let result = decode_cart(CartId::Token(token()), &[]);

        assert!(
            matches!(result, Err(CartError::CartNotFound(_))),
            "expected CartNotFound, got {result:?}"
        );
    }

    #[test]
    fn items_without_metadata_are_corrupted() {
        let cart = token();
        let records = vec![item_record(
            cart,
            &ItemUpdate::new(ProductId::new(1), 1),
            "One",
        )];

        let result = decode_cart(CartId::Token(cart), &records);

        assert!(
            matches!(result, Err(CartError::CorruptedCart(_))),
            "expected CorruptedCart, got {result:?}"
        );
    }

    #[test]
    fn mistyped_attribute_is_malformed() {
        let cart = token();
        let mut record = cart_record(cart, CustomerId::new(1), CartStatus::Active);
        record.insert(
            "customer_id".to_owned(),
            AttributeValue::S("one".to_owned()),
        );

        let result = decode_cart(CartId::Token(cart), &[record]);

        assert!(
            matches!(result, Err(CartError::Store(StoreError::Malformed(_)))),
            "expected Malformed, got {result:?}"
        );
    }
}
