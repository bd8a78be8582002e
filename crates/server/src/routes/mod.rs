//! Route groups.

pub mod categories;
pub mod price_nodes;
pub mod sheets;
pub mod vendors;

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use pricetree_store::{Pricebook, StoreError};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Run a store operation off the async runtime
pub(crate) async fn blocking<T, F>(state: &AppState, op: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce(&Pricebook) -> Result<T, StoreError> + Send + 'static,
{
    let pricebook = Arc::clone(&state.pricebook);
    tokio::task::spawn_blocking(move || op(&pricebook))
        .await
        .map_err(|err| ApiError::internal(format!("store task failed: {err}")))?
        .map_err(ApiError::from)
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}
