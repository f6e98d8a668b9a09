//! Get Cart Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{carts::models::CartResponse, errors::ApiError, extensions::*, state::State};

/// Get Cart Handler
///
/// Returns a cart with its items.
#[handler]
#[tracing::instrument(name = "carts.get", skip_all, fields(cart = tracing::field::Empty))]
pub(crate) async fn handler(req: &mut Request, depot: &mut Depot) -> Result<Json<CartResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let cart = req.path_param_or_400("id")?;

    tracing::Span::current().record("cart", cart.as_str());

    let cart = state.app.carts.get_cart(&state.op_context(), &cart).await?;

    Ok(Json(cart.into()))
}
