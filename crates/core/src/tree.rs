//! In-memory category tree rooted at one chosen root category

use crate::category::{CategoryId, CategoryNode};
use crate::error::TreeError;
use ahash::AHashMap;
use smallvec::SmallVec;

/// Mapping from id to parent id (None for root-level nodes)
pub type ParentMap = AHashMap<CategoryId, Option<CategoryId>>;

/// Ancestor chain, nearest first; catalogs are rarely deeper than a handful of levels
pub type Ancestors = SmallVec<[CategoryId; 8]>;

/// A fully materialized category subtree
///
/// The chosen root category is not itself a node: its direct children
/// are the `root_ids`, and their `parent_map` entries are `None`.
#[derive(Debug, Clone)]
pub struct CategoryTree {
    root: CategoryId,
    nodes: AHashMap<CategoryId, CategoryNode>,
    root_ids: Vec<CategoryId>,
    parent_map: ParentMap,
    /// Ids in the order they were fetched
    order: Vec<CategoryId>,
}

impl CategoryTree {
    /// Link every admitted node into its parent's `children`.
    ///
    /// `order` is the admission order; children end up in that order,
    /// which for siblings is the order the catalog returned them.
    pub(crate) fn assemble(
        root: CategoryId,
        order: Vec<CategoryId>,
        mut nodes: AHashMap<CategoryId, CategoryNode>,
        parent_map: ParentMap,
    ) -> Result<Self, TreeError> {
        let mut root_ids = Vec::new();

        for id in &order {
            match parent_map.get(id) {
                Some(Some(parent)) => {
                    let parent_node = nodes.get_mut(parent).ok_or_else(|| {
                        TreeError::InconsistentCatalogReference {
                            id: id.clone(),
                            parent_id: parent.clone(),
                        }
                    })?;
                    parent_node.children.push(id.clone());
                }
                Some(None) => root_ids.push(id.clone()),
                None => return Err(TreeError::UnknownCategory(id.clone())),
            }
        }

        Ok(Self {
            root,
            nodes,
            root_ids,
            parent_map,
            order,
        })
    }

    /// An empty tree for a root with no children
    pub fn empty(root: CategoryId) -> Self {
        Self {
            root,
            nodes: AHashMap::new(),
            root_ids: Vec::new(),
            parent_map: ParentMap::new(),
            order: Vec::new(),
        }
    }

    /// The root category this tree was built from
    pub fn root(&self) -> &CategoryId {
        &self.root
    }

    pub fn root_ids(&self) -> &[CategoryId] {
        &self.root_ids
    }

    pub fn parent_map(&self) -> &ParentMap {
        &self.parent_map
    }

    pub fn node(&self, id: &CategoryId) -> Option<&CategoryNode> {
        self.nodes.get(id)
    }

    pub(crate) fn node_mut(&mut self, id: &CategoryId) -> Option<&mut CategoryNode> {
        self.nodes.get_mut(id)
    }

    pub fn contains(&self, id: &CategoryId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Parent of `id`, or None for root-level and unknown ids
    pub fn parent_of(&self, id: &CategoryId) -> Option<&CategoryId> {
        self.parent_map.get(id).and_then(Option::as_ref)
    }

    /// Direct children of `id` (empty for leaves and unknown ids)
    pub fn children_of(&self, id: &CategoryId) -> &[CategoryId] {
        self.nodes.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Every id transitively below `id`, in depth-first pre-order
    pub fn descendants(&self, id: &CategoryId) -> Vec<CategoryId> {
        let mut out = Vec::new();
        let mut stack: Vec<&CategoryId> = self.children_of(id).iter().rev().collect();

        while let Some(current) = stack.pop() {
            out.push(current.clone());
            stack.extend(self.children_of(current).iter().rev());
        }

        out
    }

    /// Parents of `id` up to the root level, nearest first
    pub fn ancestors(&self, id: &CategoryId) -> Ancestors {
        let mut out = Ancestors::new();
        let mut current = id;

        while let Some(parent) = self.parent_of(current) {
            out.push(parent.clone());
            current = parent;
        }

        out
    }

    /// Depth below the root category (root-level nodes are depth 1)
    pub fn depth(&self, id: &CategoryId) -> usize {
        self.ancestors(id).len() + 1
    }

    /// All nodes in depth-first pre-order from the root-level nodes
    pub fn preorder(&self) -> Vec<&CategoryNode> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<&CategoryId> = self.root_ids.iter().rev().collect();

        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.get(id) {
                out.push(node);
                stack.extend(node.children.iter().rev());
            }
        }

        out
    }

    /// Ids of every leaf node, in pre-order
    pub fn leaf_ids(&self) -> Vec<CategoryId> {
        self.preorder()
            .into_iter()
            .filter(|n| n.is_leaf())
            .map(|n| n.id.clone())
            .collect()
    }

    /// Ids in fetch order
    pub fn fetch_order(&self) -> &[CategoryId] {
        &self.order
    }
}
