//! Error types for tree construction and selection

use crate::category::CategoryId;
use crate::fetch::FetchError;

/// Errors produced while building or manipulating a category tree
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// A child-listing request failed; no partial tree is exposed
    #[error("failed to fetch children of {parent}")]
    FetchFailure {
        /// Parent whose children were requested ("<top-level>" when none)
        parent: String,
        #[source]
        source: FetchError,
    },

    /// A record's parent does not match where it was found in the catalog
    #[error("category {id} references parent {parent_id}, which was never fetched as its parent")]
    InconsistentCatalogReference {
        id: CategoryId,
        parent_id: CategoryId,
    },

    /// The same id was listed twice inside one subtree
    #[error("category {id} appears more than once under root {root}")]
    DuplicateCategory { id: CategoryId, root: CategoryId },

    /// An operation named an id that is not in the tree
    #[error("unknown category: {0}")]
    UnknownCategory(CategoryId),

    /// A newer build superseded this one
    #[error("tree build for root {root} was superseded by a newer session")]
    Cancelled { root: CategoryId },

    /// The session has no tree installed yet
    #[error("no category tree is loaded")]
    NoTree,
}

impl TreeError {
    pub(crate) fn fetch_failure(parent: Option<&CategoryId>, source: FetchError) -> Self {
        Self::FetchFailure {
            parent: parent
                .map(|p| p.to_string())
                .unwrap_or_else(|| "<top-level>".to_string()),
            source,
        }
    }
}
