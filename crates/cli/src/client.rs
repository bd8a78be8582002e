//! HTTP client for the pricing API.

use pricetree_core::{CategoryId, CategoryRecord, SyncReport, SyncRequest, SyncResponse};
use pricetree_server::ApiErrorResponse;
use pricetree_store::{PriceTreeNode, SheetRow, Vendor, VendorEdit, VendorPriceNode};
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::time::Duration;
use tracing::debug;
use ulid::Ulid;

use crate::config::ApiConfig;

/// Errors from talking to the API
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The server answered with a non-2xx status
    #[error("{code} ({status}): {message}")]
    Rejected { status: u16, code: String, message: String },

    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to decode response from {url}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid API base url: {0}")]
    InvalidBaseUrl(String),
}

impl ClientError {
    /// Stable error code when the server rejected the request
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Rejected { code, .. } => Some(code),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ImportResponse {
    imported: usize,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ActiveLeaves {
    active_leaf_category_ids: Vec<CategoryId>,
}

/// API client for the categories, price node and sheet endpoints.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base: Url,
}

impl ApiClient {
    /// Creates a new API client from configuration.
    pub fn new(config: &ApiConfig) -> Result<Self, ClientError> {
        Self::with_base_url(&config.base_url, Duration::from_secs(config.timeout_secs))
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let base = Url::parse(base_url).map_err(|e| ClientError::InvalidBaseUrl(format!("{base_url}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl(base_url.to_string()));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| ClientError::Transport {
                url: base_url.to_string(),
                source,
            })?;
        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Build an endpoint URL; segments are percent-encoded
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // infallible: cannot-be-a-base urls are rejected in `with_base_url`
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, url: &Url) -> Result<T, ClientError> {
        let response = self.execute(request, url).await?;
        response.json().await.map_err(|source| ClientError::Decode {
            url: url.to_string(),
            source,
        })
    }

    async fn execute(&self, request: RequestBuilder, url: &Url) -> Result<Response, ClientError> {
        debug!("Calling {}", url);
        let response = request.send().await.map_err(|source| ClientError::Transport {
            url: url.to_string(),
            source,
        })?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.map_err(|source| ClientError::Decode {
            url: url.to_string(),
            source,
        })?;
        Err(match serde_json::from_str::<ApiErrorResponse>(&body) {
            Ok(payload) => ClientError::Rejected {
                status: status.as_u16(),
                code: payload.error.error_code,
                message: payload.error.message,
            },
            Err(_) => ClientError::Rejected {
                status: status.as_u16(),
                code: format!("HTTP_{}", status.as_u16()),
                message: body,
            },
        })
    }

    /// `GET /categories?parentId=`
    pub async fn categories(&self, parent: Option<&CategoryId>) -> Result<Vec<CategoryRecord>, ClientError> {
        let url = self.url(&["categories"]);
        let mut request = self.client.get(url.clone());
        if let Some(parent) = parent {
            request = request.query(&[("parentId", parent.as_str())]);
        }
        self.send(request, &url).await
    }

    pub async fn category(&self, id: &CategoryId) -> Result<CategoryRecord, ClientError> {
        let url = self.url(&["categories", id.as_str()]);
        self.send(self.client.get(url.clone()), &url).await
    }

    /// Replace the server catalog; returns the number of imported records
    pub async fn import_catalog(&self, records: &[CategoryRecord]) -> Result<usize, ClientError> {
        let url = self.url(&["categories"]);
        let response: ImportResponse = self.send(self.client.put(url.clone()).json(records), &url).await?;
        Ok(response.imported)
    }

    pub async fn register_vendor(&self, id: &str, name: &str) -> Result<Vendor, ClientError> {
        let url = self.url(&["vendors"]);
        let body = json!({"id": id, "name": name});
        self.send(self.client.post(url.clone()).json(&body), &url).await
    }

    pub async fn vendors(&self) -> Result<Vec<Vendor>, ClientError> {
        let url = self.url(&["vendors"]);
        self.send(self.client.get(url.clone()), &url).await
    }

    /// Post a sync request once; no retries
    pub async fn sync(&self, request: &SyncRequest) -> Result<SyncReport, ClientError> {
        let url = self.url(&["vendor-price-nodes", "sync"]);
        let response: SyncResponse = self.send(self.client.post(url.clone()).json(request), &url).await?;
        Ok(response.report)
    }

    fn tree_query<'a>(vendor: &'a str, root: &'a CategoryId) -> [(&'static str, &'a str); 2] {
        [("vendorId", vendor), ("rootCategoryId", root.as_str())]
    }

    pub async fn nodes(&self, vendor: &str, root: &CategoryId) -> Result<Vec<VendorPriceNode>, ClientError> {
        let url = self.url(&["vendor-price-nodes"]);
        let request = self.client.get(url.clone()).query(&Self::tree_query(vendor, root));
        self.send(request, &url).await
    }

    pub async fn price_tree(&self, vendor: &str, root: &CategoryId) -> Result<Vec<PriceTreeNode>, ClientError> {
        let url = self.url(&["vendor-price-nodes", "tree"]);
        let request = self.client.get(url.clone()).query(&Self::tree_query(vendor, root));
        self.send(request, &url).await
    }

    pub async fn active_leaves(&self, vendor: &str, root: &CategoryId) -> Result<Vec<CategoryId>, ClientError> {
        let url = self.url(&["vendor-price-nodes", "active-leaves"]);
        let request = self.client.get(url.clone()).query(&Self::tree_query(vendor, root));
        let response: ActiveLeaves = self.send(request, &url).await?;
        Ok(response.active_leaf_category_ids)
    }

    pub async fn edit_node(
        &self,
        vendor: &str,
        root: &CategoryId,
        category: &CategoryId,
        edit: &VendorEdit,
    ) -> Result<VendorPriceNode, ClientError> {
        let url = self.url(&["vendor-price-nodes", vendor, root.as_str(), category.as_str()]);
        self.send(self.client.patch(url.clone()).json(edit), &url).await
    }

    pub async fn sheet_rows(&self, sheet: &str, vendor: &str) -> Result<Vec<SheetRow>, ClientError> {
        let url = self.url(&["sheets", sheet, "rows"]);
        let request = self.client.get(url.clone()).query(&[("vendorId", vendor)]);
        self.send(request, &url).await
    }

    pub async fn upsert_sheet_row(
        &self,
        sheet: &str,
        vendor: &str,
        row_id: Option<Ulid>,
        cells: Map<String, Value>,
    ) -> Result<SheetRow, ClientError> {
        let url = self.url(&["sheets", sheet, "rows"]);
        let body = json!({"rowId": row_id, "cells": cells});
        let request = self.client.post(url.clone()).query(&[("vendorId", vendor)]).json(&body);
        self.send(request, &url).await
    }

    pub async fn delete_sheet_row(&self, sheet: &str, vendor: &str, row_id: Ulid) -> Result<(), ClientError> {
        let row = row_id.to_string();
        let url = self.url(&["sheets", sheet, "rows", row.as_str()]);
        let request = self.client.delete(url.clone()).query(&[("vendorId", vendor)]);
        self.execute(request, &url).await.map(|_| ())
    }
}
