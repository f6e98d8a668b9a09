//! Update Cart Items Handler

use std::sync::Arc;

use salvo::prelude::*;
use serde::{Deserialize, Serialize};

use carts::prelude::{ItemUpdate, ProductId};

use crate::{carts::models::MessageResponse, errors::ApiError, extensions::*, state::State};

/// One requested quantity change.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub(crate) struct ItemUpdateRequest {
    pub product_id: u32,
    pub quantity: u32,
}

impl From<ItemUpdateRequest> for ItemUpdate {
    fn from(request: ItemUpdateRequest) -> Self {
        ItemUpdate::new(ProductId::new(request.product_id), request.quantity)
    }
}

/// Update Cart Items Request
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct UpdateItemsRequest {
    pub items: Vec<ItemUpdateRequest>,
}

/// Update Cart Items Handler
///
/// Sets the quantity of each listed product. Zero quantities are skipped.
#[handler]
#[tracing::instrument(
    name = "carts.items.update",
    skip_all,
    fields(cart = tracing::field::Empty, items = tracing::field::Empty)
)]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<MessageResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let cart = req.path_param_or_400("id")?;
    let request: UpdateItemsRequest = req.json_or_400().await?;

    let span = tracing::Span::current();

    span.record("cart", cart.as_str());
    span.record("items", request.items.len());

    let items = request.items.into_iter().map(ItemUpdate::from).collect();

    let outcome = state
        .app
        .carts
        .update_items(&state.op_context(), &cart, items)
        .await?;

    let message = if outcome.applied == 0 {
        "No items to update.".to_owned()
    } else {
        format!("Cart {} updated", outcome.cart_id)
    };

    Ok(Json(MessageResponse::new(message)))
}
