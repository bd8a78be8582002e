//! Selection closure over a category tree
//!
//! Selecting a node selects its whole subtree and its lineage.
//! Deselecting removes the subtree and then prunes each ancestor, nearest
//! first, that is left without a selected direct child. Partial selection
//! is never stored; `check_state` derives it from the children.

use crate::category::CategoryId;
use crate::error::TreeError;
use crate::tree::CategoryTree;
use std::collections::HashMap;
use tracing::warn;

/// Presentation state of one checkbox
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    Checked,
    /// Selected, but only some direct children are
    Partial,
    Unchecked,
}

/// The set of selected category ids
///
/// Iteration follows first-insertion order: an id keeps its position
/// while it stays selected and moves to the end if it is removed and
/// selected again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// id -> insertion sequence
    selected: HashMap<CategoryId, u64, ahash::RandomState>,
    next_seq: u64,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a selection from a persisted active-leaf set
    ///
    /// Each leaf is selected together with its ancestors, which is the
    /// state the toggles that produced those leaves would have left.
    /// Leaves the tree no longer knows are skipped.
    pub fn from_leaves<'a>(tree: &CategoryTree, leaves: impl IntoIterator<Item = &'a CategoryId>) -> Self {
        let mut selection = Self::new();
        for leaf in leaves {
            match tree.node(leaf) {
                Some(node) if node.is_leaf() => {
                    selection.insert(leaf);
                    for ancestor in tree.ancestors(leaf) {
                        selection.insert(&ancestor);
                    }
                }
                Some(_) => warn!("Ignoring persisted leaf {} which now has children", leaf),
                None => warn!("Ignoring persisted leaf {} which is not in the tree", leaf),
            }
        }
        selection
    }

    pub fn contains(&self, id: &CategoryId) -> bool {
        self.selected.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Selected ids in insertion order
    pub fn ids(&self) -> Vec<CategoryId> {
        let mut entries: Vec<(&CategoryId, u64)> = self.selected.iter().map(|(id, seq)| (id, *seq)).collect();
        entries.sort_unstable_by_key(|(_, seq)| *seq);
        entries.into_iter().map(|(id, _)| id.clone()).collect()
    }

    /// Deselect when selected, select otherwise
    pub fn toggle_select(&mut self, tree: &CategoryTree, id: &CategoryId) -> Result<(), TreeError> {
        if self.contains(id) {
            self.deselect(tree, id)
        } else {
            self.select(tree, id)
        }
    }

    /// Select `id`, its descendants and its ancestors; no-op if already selected
    pub fn select(&mut self, tree: &CategoryTree, id: &CategoryId) -> Result<(), TreeError> {
        ensure_known(tree, id)?;
        if self.contains(id) {
            return Ok(());
        }

        self.insert(id);
        for descendant in tree.descendants(id) {
            self.insert(&descendant);
        }
        for ancestor in tree.ancestors(id) {
            self.insert(&ancestor);
        }
        Ok(())
    }

    /// Remove `id` and its descendants, then prune emptied ancestors; no-op if not selected
    pub fn deselect(&mut self, tree: &CategoryTree, id: &CategoryId) -> Result<(), TreeError> {
        ensure_known(tree, id)?;
        if !self.contains(id) {
            return Ok(());
        }

        self.selected.remove(id);
        for descendant in tree.descendants(id) {
            self.selected.remove(&descendant);
        }

        // Nearest first, against the progressively updated set
        for ancestor in tree.ancestors(id) {
            let keep = tree.children_of(&ancestor).iter().any(|c| self.contains(c));
            if !keep {
                self.selected.remove(&ancestor);
            }
        }
        Ok(())
    }

    /// Checkbox state for `id`
    pub fn check_state(&self, tree: &CategoryTree, id: &CategoryId) -> CheckState {
        if !self.contains(id) {
            return CheckState::Unchecked;
        }
        let children = tree.children_of(id);
        if children.iter().all(|c| self.contains(c)) {
            CheckState::Checked
        } else {
            CheckState::Partial
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    fn insert(&mut self, id: &CategoryId) {
        if !self.selected.contains_key(id) {
            self.selected.insert(id.clone(), self.next_seq);
            self.next_seq += 1;
        }
    }
}

/// Flip the presentation-only `expanded` flag; never touches a selection
pub fn toggle_expand(tree: &mut CategoryTree, id: &CategoryId) -> Result<bool, TreeError> {
    let node = tree
        .node_mut(id)
        .ok_or_else(|| TreeError::UnknownCategory(id.clone()))?;
    node.expanded = !node.expanded;
    Ok(node.expanded)
}

fn ensure_known(tree: &CategoryTree, id: &CategoryId) -> Result<(), TreeError> {
    if tree.contains(id) {
        Ok(())
    } else {
        Err(TreeError::UnknownCategory(id.clone()))
    }
}
