//! Durable vendor pricing hierarchy
//!
//! This crate provides:
//! - Master catalog storage (sled embedded DB), usable as a `CategoryFetcher`
//! - Vendor registry
//! - VendorPriceNode storage keyed by (vendor, root, category)
//! - Leaf-set reconciliation into a vendor's pricing tree
//! - Vendor edits and tree queries over the stored hierarchy
//! - A generic wide-row store for per-category pricing sheets

pub mod catalog;
pub mod error;
mod keys;
pub mod node;
pub mod pricebook;
mod reconcile;
pub mod sheets;

// Re-exports
pub use catalog::CatalogStore;
pub use error::{StoreError, SyncRejection};
pub use node::{NodeSource, PriceTreeNode, PricingStatus, Vendor, VendorEdit, VendorPriceNode};
pub use pricebook::Pricebook;
pub use sheets::{partition_key, SheetRow, SheetStore};

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Current time as Unix milliseconds
pub(crate) fn now_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
