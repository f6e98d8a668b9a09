//! Healthcheck Handler

use salvo::prelude::*;

/// Liveness check; does not touch storage.
#[handler]
pub(crate) async fn handler() -> &'static str {
    "OK"
}
