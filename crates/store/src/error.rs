//! Store error types

use pricetree_core::CategoryId;

/// Why a sync payload was refused before anything was written
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncRejection {
    #[error("vendor id must be non-empty and must not contain NUL")]
    InvalidVendorId,
    #[error("unknown vendor: {0}")]
    UnknownVendor(String),
    #[error("unknown root category: {0}")]
    UnknownRoot(CategoryId),
    #[error("invalid category id: {0:?}")]
    InvalidCategoryId(CategoryId),
    #[error("unknown category: {0}")]
    UnknownCategory(CategoryId),
    #[error("category {0} has children and cannot be an active leaf")]
    NotALeaf(CategoryId),
    #[error("category {category} is not below root {root}")]
    OutsideRoot { category: CategoryId, root: CategoryId },
}

/// Errors from the catalog, pricing node and sheet stores
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sync rejected: {0}")]
    SyncRejected(#[from] SyncRejection),

    /// A second node for an existing (vendor, root, category) triple
    #[error("price node already exists for vendor {vendor_id}, root {root_category_id}, category {category_id}")]
    UniquenessViolation {
        vendor_id: String,
        root_category_id: CategoryId,
        category_id: CategoryId,
    },

    #[error("no price node for vendor {vendor_id}, root {root_category_id}, category {category_id}")]
    NodeNotFound {
        vendor_id: String,
        root_category_id: CategoryId,
        category_id: CategoryId,
    },

    #[error("category {0} is not a leaf; only leaf nodes carry a price")]
    PriceOnNonLeaf(CategoryId),

    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error("invalid sheet row: {0}")]
    InvalidSheetRow(String),

    #[error("vendor id must be non-empty and must not contain NUL")]
    InvalidVendorId,

    #[error("corrupt store: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Sled(#[from] sled::Error),

    #[error("failed to decode {what}")]
    Codec {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub(crate) fn codec(what: &'static str) -> impl FnOnce(serde_json::Error) -> Self {
        move |source| Self::Codec { what, source }
    }
}

impl From<sled::transaction::TransactionError<StoreError>> for StoreError {
    fn from(err: sled::transaction::TransactionError<StoreError>) -> Self {
        match err {
            sled::transaction::TransactionError::Abort(e) => e,
            sled::transaction::TransactionError::Storage(e) => Self::Sled(e),
        }
    }
}
