//! Category fetching: the seam between the tree builder and the catalog API

use crate::category::{CategoryId, CategoryRecord};
use async_trait::async_trait;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Error returned by a fetcher; wrapped into `TreeError::FetchFailure`
pub type FetchError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Source of category records, one round trip per parent
#[async_trait]
pub trait CategoryFetcher: Send + Sync {
    /// Return the ordered direct children of `parent` (top-level categories when `None`)
    async fn children(&self, parent: Option<&CategoryId>) -> Result<Vec<CategoryRecord>, FetchError>;
}

#[async_trait]
impl<T: CategoryFetcher + ?Sized> CategoryFetcher for Arc<T> {
    async fn children(&self, parent: Option<&CategoryId>) -> Result<Vec<CategoryRecord>, FetchError> {
        (**self).children(parent).await
    }
}

#[async_trait]
impl<T: CategoryFetcher + ?Sized> CategoryFetcher for &T {
    async fn children(&self, parent: Option<&CategoryId>) -> Result<Vec<CategoryRecord>, FetchError> {
        (**self).children(parent).await
    }
}

/// How the tree builder issues fetches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStrategy {
    /// Depth-first, one request at a time
    Sequential,
    /// Level by level, at most `max_in_flight` requests outstanding
    Parallel { max_in_flight: NonZeroUsize },
}

impl FetchStrategy {
    /// Parallel strategy; a zero bound falls back to sequential
    pub fn parallel(max_in_flight: usize) -> Self {
        match NonZeroUsize::new(max_in_flight) {
            Some(max_in_flight) => Self::Parallel { max_in_flight },
            None => Self::Sequential,
        }
    }
}

impl Default for FetchStrategy {
    fn default() -> Self {
        Self::Sequential
    }
}
