//! Update Product Details Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{errors::ApiError, extensions::*, products::models::ProductBody, state::State};

/// Update Product Details Handler
///
/// Replaces the details of an existing product. Answers 204 with no body.
#[handler]
#[tracing::instrument(name = "products.update", skip_all, fields(product = tracing::field::Empty))]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
) -> Result<StatusCode, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let product = req.path_param_or_400("id")?;
    let details: ProductBody = req.json_or_400().await?;

    tracing::Span::current().record("product", product.as_str());

    state
        .products()?
        .update_product(&state.op_context(), &product, details.into())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
