//! Category fetcher backed by `GET /categories`

use async_trait::async_trait;
use pricetree_core::{CategoryFetcher, CategoryId, CategoryRecord, FetchError};

use crate::client::ApiClient;

/// Fetches catalog children over HTTP, one request per parent
#[derive(Clone)]
pub struct HttpCategoryFetcher {
    client: ApiClient,
}

impl HttpCategoryFetcher {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CategoryFetcher for HttpCategoryFetcher {
    async fn children(&self, parent: Option<&CategoryId>) -> Result<Vec<CategoryRecord>, FetchError> {
        self.client.categories(parent).await.map_err(FetchError::from)
    }
}
