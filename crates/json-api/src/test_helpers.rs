//! Test helpers.

use std::{sync::Arc, time::Duration};

use salvo::{affix_state::inject, prelude::*};

use carts::prelude::{MockCartsService, MockProductsService};
use carts_app::context::AppContext;

use crate::state::State;

pub(crate) fn state_with_carts(carts: MockCartsService) -> Arc<State> {
    State::from_app_context(AppContext::new(Arc::new(carts)), Duration::from_secs(5))
}

pub(crate) fn state_with_products(products: MockProductsService) -> Arc<State> {
    let app = AppContext::new(Arc::new(MockCartsService::new())).with_products(Arc::new(products));

    State::from_app_context(app, Duration::from_secs(5))
}

pub(crate) fn carts_service(carts: MockCartsService, route: Router) -> Service {
    with_state(state_with_carts(carts), route)
}

pub(crate) fn products_service(products: MockProductsService, route: Router) -> Service {
    with_state(state_with_products(products), route)
}

fn with_state(state: Arc<State>, route: Router) -> Service {
    Service::new(Router::new().hoop(inject(state)).push(route))
}
