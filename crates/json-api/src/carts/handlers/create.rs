//! Create Cart Handler

use std::sync::Arc;

use salvo::prelude::*;
use serde::{Deserialize, Serialize};

use carts::prelude::CustomerId;

use crate::{carts::models::CartIdResponse, errors::ApiError, extensions::*, state::State};

/// Create Cart Request
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct CreateCartRequest {
    pub customer_id: u64,
}

/// Cart Created Response
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct CartCreatedResponse {
    /// Created cart identifier
    pub cart_id: CartIdResponse,

    /// Initial status
    pub status: String,
}

/// Create Cart Handler
#[handler]
#[tracing::instrument(
    name = "carts.create",
    skip_all,
    fields(customer_id = tracing::field::Empty)
)]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<CartCreatedResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let request: CreateCartRequest = req.json_or_400().await?;

    tracing::Span::current().record("customer_id", request.customer_id);

    let created = state
        .app
        .carts
        .create_cart(&state.op_context(), CustomerId::new(request.customer_id))
        .await?;

    res.status_code(StatusCode::CREATED);

    Ok(Json(CartCreatedResponse {
        cart_id: created.id.into(),
        status: created.status.to_string(),
    }))
}
