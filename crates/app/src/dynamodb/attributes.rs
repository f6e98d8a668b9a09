//! Conversion between cart records and SDK attribute maps

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue as SdkValue;

use carts::store::records::{AttributeValue, Item};

pub(crate) type SdkItem = HashMap<String, SdkValue>;

pub(crate) fn to_sdk(item: Item) -> SdkItem {
    item.into_iter()
        .map(|(name, value)| {
            let value = match value {
                AttributeValue::S(s) => SdkValue::S(s),
                AttributeValue::N(n) => SdkValue::N(n),
            };

            (name, value)
        })
        .collect()
}

/// Attributes of other types are dropped; cart records never use them.
pub(crate) fn from_sdk(item: &SdkItem) -> Item {
    item.iter()
        .filter_map(|(name, value)| {
            let value = match value {
                SdkValue::S(s) => AttributeValue::S(s.clone()),
                SdkValue::N(n) => AttributeValue::N(n.clone()),
                _ => return None,
            };

            Some((name.clone(), value))
        })
        .collect()
}
