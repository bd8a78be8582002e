//! Caller-owned tree session
//!
//! A session holds at most one tree and its selection. Starting a new
//! build discards both and invalidates every earlier `BuildTicket`, so a
//! build that was abandoned mid-flight can never be installed over the
//! newer one.

use crate::builder::TreeBuilder;
use crate::category::CategoryId;
use crate::error::TreeError;
use crate::fetch::CategoryFetcher;
use crate::leaves::selected_leaf_ids;
use crate::selection::{self, CheckState, Selection};
use crate::sync::SyncRequest;
use crate::tree::CategoryTree;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Handle identifying one build generation of a session
#[derive(Debug, Clone)]
pub struct BuildTicket {
    root: CategoryId,
    generation: u64,
    current: Arc<AtomicU64>,
}

impl BuildTicket {
    pub fn root(&self) -> &CategoryId {
        &self.root
    }

    /// False once the owning session has started a newer build
    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::SeqCst) == self.generation
    }
}

#[derive(Debug)]
struct Loaded {
    tree: CategoryTree,
    selection: Selection,
}

/// Tree and selection state for one interactive session
#[derive(Debug, Default)]
pub struct CatalogSession {
    generation: Arc<AtomicU64>,
    loaded: Option<Loaded>,
}

impl CatalogSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a build for `root`, discarding any loaded tree and selection
    pub fn begin_build(&mut self, root: CategoryId) -> BuildTicket {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.loaded = None;
        debug!("Session build {} started for root {}", generation, root);
        BuildTicket {
            root,
            generation,
            current: Arc::clone(&self.generation),
        }
    }

    /// Install a finished tree with an empty selection
    pub fn install(&mut self, ticket: &BuildTicket, tree: CategoryTree) -> Result<(), TreeError> {
        self.install_with_selection(ticket, tree, Selection::new())
    }

    /// Install a finished tree with a selection restored from persisted leaves
    pub fn install_with_leaves(
        &mut self,
        ticket: &BuildTicket,
        tree: CategoryTree,
        leaves: &[CategoryId],
    ) -> Result<(), TreeError> {
        let selection = Selection::from_leaves(&tree, leaves);
        self.install_with_selection(ticket, tree, selection)
    }

    fn install_with_selection(
        &mut self,
        ticket: &BuildTicket,
        tree: CategoryTree,
        selection: Selection,
    ) -> Result<(), TreeError> {
        if !ticket.is_current() || tree.root() != ticket.root() {
            return Err(TreeError::Cancelled {
                root: ticket.root().clone(),
            });
        }
        self.loaded = Some(Loaded { tree, selection });
        Ok(())
    }

    /// Build and install a tree for `root` in one step
    pub async fn load<F: CategoryFetcher>(
        &mut self,
        builder: &TreeBuilder<F>,
        root: CategoryId,
    ) -> Result<&CategoryTree, TreeError> {
        let ticket = self.begin_build(root);
        let tree = builder.build_for(&ticket).await?;
        self.install(&ticket, tree)?;
        self.tree()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    pub fn tree(&self) -> Result<&CategoryTree, TreeError> {
        self.loaded.as_ref().map(|l| &l.tree).ok_or(TreeError::NoTree)
    }

    pub fn selection(&self) -> Result<&Selection, TreeError> {
        self.loaded.as_ref().map(|l| &l.selection).ok_or(TreeError::NoTree)
    }

    pub fn toggle_expand(&mut self, id: &CategoryId) -> Result<bool, TreeError> {
        let loaded = self.loaded_mut()?;
        selection::toggle_expand(&mut loaded.tree, id)
    }

    pub fn toggle_select(&mut self, id: &CategoryId) -> Result<(), TreeError> {
        let loaded = self.loaded_mut()?;
        loaded.selection.toggle_select(&loaded.tree, id)
    }

    pub fn select(&mut self, id: &CategoryId) -> Result<(), TreeError> {
        let loaded = self.loaded_mut()?;
        loaded.selection.select(&loaded.tree, id)
    }

    pub fn deselect(&mut self, id: &CategoryId) -> Result<(), TreeError> {
        let loaded = self.loaded_mut()?;
        loaded.selection.deselect(&loaded.tree, id)
    }

    pub fn check_state(&self, id: &CategoryId) -> Result<CheckState, TreeError> {
        let loaded = self.loaded.as_ref().ok_or(TreeError::NoTree)?;
        Ok(loaded.selection.check_state(&loaded.tree, id))
    }

    pub fn selected_leaf_ids(&self) -> Result<Vec<CategoryId>, TreeError> {
        let loaded = self.loaded.as_ref().ok_or(TreeError::NoTree)?;
        Ok(selected_leaf_ids(&loaded.tree, &loaded.selection))
    }

    /// Payload for synchronizing this session's selection for `vendor_id`
    pub fn sync_request(&self, vendor_id: impl Into<String>) -> Result<SyncRequest, TreeError> {
        let tree = self.tree()?;
        Ok(SyncRequest::new(vendor_id, tree.root().clone(), self.selected_leaf_ids()?))
    }

    fn loaded_mut(&mut self) -> Result<&mut Loaded, TreeError> {
        self.loaded.as_mut().ok_or(TreeError::NoTree)
    }
}
