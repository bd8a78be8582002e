//! Wire types for `POST /vendor-price-nodes/sync`

use crate::category::CategoryId;
use serde::{Deserialize, Serialize};

/// Sync request body: a vendor's active leaves under one root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    pub vendor_id: String,
    pub root_category_id: CategoryId,
    pub active_leaf_category_ids: Vec<CategoryId>,
}

impl SyncRequest {
    pub fn new(vendor_id: impl Into<String>, root_category_id: CategoryId, leaves: Vec<CategoryId>) -> Self {
        Self {
            vendor_id: vendor_id.into(),
            root_category_id,
            active_leaf_category_ids: leaves,
        }
    }
}

/// Counts of what a reconciliation did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    /// Nodes inserted for categories seen for the first time
    pub created: usize,
    /// Active nodes whose stored fields changed
    pub updated: usize,
    /// Inactive nodes brought back to Active
    pub reactivated: usize,
    /// Nodes marked Inactive because they left the selection
    pub deactivated: usize,
    /// Nodes left as they were
    pub unchanged: usize,
}

impl SyncReport {
    /// Number of node writes this report stands for
    pub fn writes(&self) -> usize {
        self.created + self.updated + self.reactivated + self.deactivated
    }
}

/// Successful sync response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    pub success: bool,
    pub report: SyncReport,
}
