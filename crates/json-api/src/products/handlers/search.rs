//! Search Products Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{errors::ApiError, extensions::*, products::models::SearchResponse, state::State};

/// Search Products Handler
///
/// Matches `q` against product names and categories over a random sample of
/// the catalog. Without `q` every sampled product matches.
#[handler]
#[tracing::instrument(name = "products.search", skip_all, fields(query = tracing::field::Empty))]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<SearchResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let query = req.query::<String>("q").unwrap_or_default();

    tracing::Span::current().record("query", query.as_str());

    let results = state
        .products()?
        .search_products(&state.op_context(), &query)
        .await?;

    Ok(Json(results.into()))
}
