//! Active leaf extraction: the payload handed to synchronization

use crate::category::CategoryId;
use crate::selection::Selection;
use crate::tree::CategoryTree;

/// Selected ids whose node has no children, in selection order
///
/// Intermediate selections are implied by leaf ancestry and are not
/// returned. Ids not present in `tree` are skipped.
pub fn selected_leaf_ids(tree: &CategoryTree, selection: &Selection) -> Vec<CategoryId> {
    selection
        .ids()
        .into_iter()
        .filter(|id| tree.node(id).is_some_and(|n| n.is_leaf()))
        .collect()
}
