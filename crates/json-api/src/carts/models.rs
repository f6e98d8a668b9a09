//! Cart response bodies

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use carts::prelude::{Cart, CartId, CartItem};

/// Cart identifier as it appears on the wire: a number for sequential
/// identities, a string for tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub(crate) enum CartIdResponse {
    Sequential(u64),
    Token(Uuid),
}

impl From<CartId> for CartIdResponse {
    fn from(id: CartId) -> Self {
        match id {
            CartId::Sequential(key) => Self::Sequential(key),
            CartId::Token(token) => Self::Token(token),
        }
    }
}

/// Cart Response
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct CartResponse {
    /// Cart identifier
    pub cart_id: CartIdResponse,

    /// Owning customer
    pub customer_id: u64,

    /// Lifecycle status
    pub status: String,

    /// Items ordered by product id
    pub items: Vec<CartItemResponse>,
}

impl From<Cart> for CartResponse {
    fn from(cart: Cart) -> Self {
        Self {
            cart_id: cart.id.into(),
            customer_id: cart.customer_id.get(),
            status: cart.status.to_string(),
            items: cart.items.into_iter().map(CartItemResponse::from).collect(),
        }
    }
}

/// Cart Item Response
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct CartItemResponse {
    pub product_id: u32,
    pub product_name: String,
    pub quantity: u32,
}

impl From<CartItem> for CartItemResponse {
    fn from(item: CartItem) -> Self {
        Self {
            product_id: item.product_id.get(),
            product_name: item.product_name,
            quantity: item.quantity,
        }
    }
}

/// Plain acknowledgement body.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
