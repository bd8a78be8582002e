//! Shared state and configuration for request handlers.

use std::sync::Arc;
use std::time::Duration;

use pricetree_store::Pricebook;

/// Server-side limits applied as tower layers.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    /// Optional request timeout for handlers.
    pub request_timeout: Option<Duration>,
    /// Optional concurrency limit for handlers.
    pub concurrency_limit: Option<usize>,
}

/// Shared state for handlers.
#[derive(Clone)]
pub struct AppState {
    /// Catalog, vendor and price node storage.
    pub pricebook: Arc<Pricebook>,
    /// Server-side configuration.
    pub config: ServerConfig,
}

impl AppState {
    #[must_use]
    pub fn new(pricebook: Arc<Pricebook>) -> Self {
        Self {
            pricebook,
            config: ServerConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(pricebook: Arc<Pricebook>, config: ServerConfig) -> Self {
        Self { pricebook, config }
    }
}
