//! Library half of the `ptree` command: configuration, the API client and
//! the HTTP category fetcher used to build trees against a running server.

pub mod client;
pub mod config;
pub mod fetcher;
pub mod render;

pub use client::{ApiClient, ClientError};
pub use config::Config;
pub use fetcher::HttpCategoryFetcher;
