//! Category tree and selection engine for vendor pricing
//!
//! This crate provides:
//! - Category records and in-memory tree nodes
//! - Pluggable category fetching (sequential or bounded-parallel)
//! - Full-subtree tree construction with a parent lookup map
//! - Selection closure over descendants and ancestors
//! - Active leaf extraction and the sync request payload
//! - A caller-owned session that discards superseded builds

pub mod builder;
pub mod category;
pub mod error;
pub mod fetch;
pub mod leaves;
pub mod selection;
pub mod session;
pub mod sync;
#[cfg(any(test, feature = "test-util"))]
pub mod testing;
pub mod tree;

// Re-exports
pub use builder::TreeBuilder;
pub use category::{CategoryId, CategoryNode, CategoryRecord};
pub use error::TreeError;
pub use fetch::{CategoryFetcher, FetchError, FetchStrategy};
pub use leaves::selected_leaf_ids;
pub use selection::{toggle_expand, CheckState, Selection};
pub use session::{BuildTicket, CatalogSession};
#[cfg(any(test, feature = "test-util"))]
pub use testing::StaticFetcher;
pub use sync::{SyncReport, SyncRequest, SyncResponse};
pub use tree::{CategoryTree, ParentMap};

/// Result type for tree operations
pub type Result<T> = std::result::Result<T, TreeError>;
