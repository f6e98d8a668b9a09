//! HTTP error responses

use salvo::{
    http::StatusCode,
    prelude::*,
    writing::{Json, Scribe},
};
use serde::{Deserialize, Serialize};
use tracing::error;

use carts::prelude::{CartError, CatalogError};

/// JSON body returned with every error status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct ErrorResponse {
    /// Machine-readable error code
    pub error: String,

    /// Short human-readable summary
    pub message: String,

    /// Specifics of this failure
    pub details: String,
}

/// An error status plus its JSON body.
#[derive(Debug)]
pub(crate) struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    fn new(
        status: StatusCode,
        code: &str,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            status,
            body: ErrorResponse {
                error: code.to_owned(),
                message: message.into(),
                details: details.into(),
            },
        }
    }

    /// Unparseable body or path.
    pub(crate) fn invalid_body(details: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "INVALID_INPUT",
            "The provided request is invalid",
            details,
        )
    }

    pub(crate) fn internal(details: impl Into<String>) -> Self {
        let details = details.into();

        error!("{details}");

        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "Internal server error",
            details,
        )
    }

    #[cfg(test)]
    pub(crate) fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<CartError> for ApiError {
    fn from(error: CartError) -> Self {
        let details = error.to_string();

        match error {
            CartError::InvalidInput(_) => Self::new(
                StatusCode::BAD_REQUEST,
                "INVALID_INPUT",
                "The provided request is invalid",
                details,
            ),
            CartError::DuplicateProductInRequest(_) => Self::new(
                StatusCode::BAD_REQUEST,
                "INVALID_INPUT",
                "Duplicate product_ids in request",
                details,
            ),
            CartError::DuplicateActiveCart { .. } => Self::new(
                StatusCode::BAD_REQUEST,
                "INVALID_INPUT",
                "Active cart already exists",
                details,
            ),
            CartError::CartNotFound(_) => Self::new(
                StatusCode::NOT_FOUND,
                "CART_NOT_FOUND",
                "Shopping cart not found",
                details,
            ),
            CartError::ProductNotFound(_) => Self::new(
                StatusCode::NOT_FOUND,
                "PRODUCT_NOT_FOUND",
                "Product not found",
                details,
            ),
            CartError::CorruptedCart(cart) => {
                error!(%cart, "cart metadata record is missing");

                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CART_CORRUPTED",
                    "Shopping cart data is inconsistent",
                    details,
                )
            }
            CartError::Store(source) => {
                error!(error = ?source, "cart storage failed");

                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DB_ERROR",
                    "Database operation failed",
                    details,
                )
            }
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(error: CatalogError) -> Self {
        let details = error.to_string();

        match error {
            CatalogError::InvalidInput(_) => Self::new(
                StatusCode::BAD_REQUEST,
                "INVALID_INPUT",
                "The provided request is invalid",
                details,
            ),
            CatalogError::ProductNotFound(_) => Self::new(
                StatusCode::NOT_FOUND,
                "PRODUCT_NOT_FOUND",
                "Product not found",
                details,
            ),
            CatalogError::Store(source) => {
                error!(error = ?source, "catalog storage failed");

                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DB_ERROR",
                    "Database operation failed",
                    details,
                )
            }
        }
    }
}

impl Scribe for ApiError {
    fn render(self, res: &mut Response) {
        res.status_code(self.status);
        res.render(Json(self.body));
    }
}
