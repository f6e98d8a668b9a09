//! Maintenance Handlers

use std::sync::Arc;

use salvo::prelude::*;
use tracing::info;

use crate::{carts::models::MessageResponse, errors::ApiError, extensions::*, state::State};

/// Delete every cart and item in the configured backend.
#[handler]
pub(crate) async fn clear_carts(depot: &mut Depot) -> Result<Json<MessageResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    state.app.carts.clear_carts(&state.op_context()).await?;

    info!("shopping cart data cleared via maintenance endpoint");

    Ok(Json(MessageResponse::new("Shopping cart data cleared")))
}
