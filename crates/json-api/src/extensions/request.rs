//! Request helper extensions.

use salvo::prelude::Request;
use serde::de::DeserializeOwned;

use crate::errors::ApiError;

/// Extraction helpers that fail with the API's JSON error body.
pub(crate) trait RequestExt {
    /// Path parameter as raw text.
    fn path_param_or_400(&self, name: &str) -> Result<String, ApiError>;

    /// Request body decoded as JSON.
    async fn json_or_400<T: DeserializeOwned + Send>(&mut self) -> Result<T, ApiError>;
}

impl RequestExt for Request {
    fn path_param_or_400(&self, name: &str) -> Result<String, ApiError> {
        self.param::<String>(name)
            .ok_or_else(|| ApiError::invalid_body(format!("missing path parameter `{name}`")))
    }

    async fn json_or_400<T: DeserializeOwned + Send>(&mut self) -> Result<T, ApiError> {
        self.parse_json::<T>()
            .await
            .map_err(|source| ApiError::invalid_body(source.to_string()))
    }
}
