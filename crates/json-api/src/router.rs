//! App Router

use salvo::Router;

use crate::{
    carts::{create, get, items::update},
    debug, healthcheck, products,
};

/// Routes for the whole API. Product routes are mounted only when the
/// backend keeps a catalog.
pub(crate) fn app_router(with_catalog: bool) -> Router {
    let router = Router::new()
        .push(Router::with_path("health").get(healthcheck::handler))
        .push(
            Router::with_path("shopping-carts")
                .post(create::handler)
                .push(
                    Router::with_path("{id}")
                        .get(get::handler)
                        .push(Router::with_path("items").post(update::handler)),
                ),
        )
        .push(Router::with_path("debug/clear-carts").delete(debug::clear_carts));

    if with_catalog {
        router.push(products_router())
    } else {
        router
    }
}

fn products_router() -> Router {
    Router::with_path("products")
        .push(Router::with_path("search").get(products::search::handler))
        .push(
            Router::with_path("{id}")
                .get(products::get::handler)
                .push(Router::with_path("details").post(products::update::handler)),
        )
}
