//! Get Product Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{errors::ApiError, extensions::*, products::models::ProductBody, state::State};

/// Get Product Handler
///
/// Returns a product's catalog entry.
#[handler]
#[tracing::instrument(name = "products.get", skip_all, fields(product = tracing::field::Empty))]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<ProductBody>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let product = req.path_param_or_400("id")?;

    tracing::Span::current().record("product", product.as_str());

    let product = state
        .products()?
        .get_product(&state.op_context(), &product)
        .await?;

    Ok(Json(product.into()))
}
