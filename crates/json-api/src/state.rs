//! State

use std::{sync::Arc, time::Duration};

use carts::prelude::{OpContext, ProductsService};
use carts_app::context::AppContext;

use crate::errors::ApiError;

#[derive(Clone)]
pub(crate) struct State {
    pub(crate) app: AppContext,
    request_timeout: Duration,
}

impl State {
    #[must_use]
    pub(crate) fn new(app: AppContext, request_timeout: Duration) -> Self {
        Self {
            app,
            request_timeout,
        }
    }

    #[must_use]
    pub(crate) fn from_app_context(app: AppContext, request_timeout: Duration) -> Arc<Self> {
        Arc::new(Self::new(app, request_timeout))
    }

    /// Product catalog, or a 500 when the backend keeps none.
    pub(crate) fn products(&self) -> Result<&Arc<dyn ProductsService>, ApiError> {
        self.app
            .products
            .as_ref()
            .ok_or_else(|| ApiError::internal("product catalog is not configured"))
    }

    /// Fresh operation context carrying the per-request deadline.
    #[must_use]
    pub(crate) fn op_context(&self) -> OpContext {
        OpContext::new().with_timeout(self.request_timeout)
    }
}
