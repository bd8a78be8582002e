//! Vendor price node store using sled

use crate::catalog::CatalogStore;
use crate::error::StoreError;
use crate::keys;
use crate::node::{NodeSource, PriceTreeNode, Vendor, VendorEdit, VendorPriceNode};
use crate::sheets::SheetStore;
use crate::{now_ms, Result};
use ahash::AHashSet;
use parking_lot::Mutex;
use pricetree_core::CategoryId;
use sled::{Db, Tree};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};
use ulid::Ulid;

/// Durable pricing hierarchy for every vendor
///
/// One sled database holds the catalog, the vendor registry, the price
/// nodes with their parent and id indexes, and the sheet rows.
pub struct Pricebook {
    db: Db,
    catalog: CatalogStore,
    sheets: SheetStore,
    vendors: Tree,
    pub(crate) nodes: Tree,
    pub(crate) by_parent: Tree,
    pub(crate) by_id: Tree,
    /// Serializes catalog replacement, syncs and edits
    pub(crate) write_lock: Arc<Mutex<()>>,
}

impl Pricebook {
    /// Open or create a pricebook under the given directory
    pub fn open(path: &Path) -> Result<Self> {
        let db = sled::open(path.join("pricetree.db"))?;
        Self::from_db(db)
    }

    /// In-memory pricebook that disappears on drop
    pub fn open_temporary() -> Result<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    fn from_db(db: Db) -> Result<Self> {
        let write_lock = Arc::new(Mutex::new(()));
        let pricebook = Self {
            catalog: CatalogStore::new(&db, write_lock.clone())?,
            sheets: SheetStore::new(&db)?,
            vendors: db.open_tree("vendors")?,
            nodes: db.open_tree("price_nodes")?,
            by_parent: db.open_tree("price_nodes_by_parent")?,
            by_id: db.open_tree("price_nodes_by_id")?,
            write_lock,
            db,
        };
        debug!("Opened pricebook (recovered: {})", pricebook.db.was_recovered());
        Ok(pricebook)
    }

    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    pub fn sheets(&self) -> &SheetStore {
        &self.sheets
    }

    /// Register a vendor; registering an existing id returns the stored vendor
    pub fn register_vendor(&self, id: &str, name: &str) -> Result<Vendor> {
        if !keys::valid_vendor_id(id) {
            return Err(StoreError::InvalidVendorId);
        }
        if let Some(existing) = self.vendor(id)? {
            return Ok(existing);
        }

        let vendor = Vendor {
            id: id.to_string(),
            name: name.to_string(),
            created_at_ms: now_ms(),
        };
        let value = serde_json::to_vec(&vendor).map_err(StoreError::codec("vendor"))?;
        self.vendors.insert(id.as_bytes(), value)?;
        info!("Registered vendor {}", id);
        Ok(vendor)
    }

    pub fn vendor(&self, id: &str) -> Result<Option<Vendor>> {
        match self.vendors.get(id.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes).map_err(StoreError::codec("vendor"))?)),
            None => Ok(None),
        }
    }

    pub fn vendors(&self) -> Result<Vec<Vendor>> {
        self.vendors
            .iter()
            .values()
            .map(|bytes| serde_json::from_slice(&bytes?).map_err(StoreError::codec("vendor")))
            .collect()
    }

    /// Look up a node by its (vendor, root, category) triple
    pub fn node(&self, vendor: &str, root: &CategoryId, category: &CategoryId) -> Result<Option<VendorPriceNode>> {
        match self.nodes.get(keys::node_key(vendor, root, category))? {
            Some(bytes) => Ok(Some(VendorPriceNode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Look up a node by id
    pub fn node_by_id(&self, id: Ulid) -> Result<Option<VendorPriceNode>> {
        let triple = match self.by_id.get(keys::id_key(id))? {
            Some(key) => key,
            None => return Ok(None),
        };
        match self.nodes.get(triple)? {
            Some(bytes) => Ok(Some(VendorPriceNode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Every node of a vendor tree, ordered by (level, sequence)
    pub fn nodes(&self, vendor: &str, root: &CategoryId) -> Result<Vec<VendorPriceNode>> {
        let mut nodes = self.scan_tree(vendor, root)?;
        nodes.sort_by(|a, b| {
            (a.level, a.sequence, &a.category_id).cmp(&(b.level, b.sequence, &b.category_id))
        });
        Ok(nodes)
    }

    pub(crate) fn scan_tree(&self, vendor: &str, root: &CategoryId) -> Result<Vec<VendorPriceNode>> {
        self.nodes
            .scan_prefix(keys::node_prefix(vendor, root))
            .values()
            .map(|bytes| VendorPriceNode::deserialize(&bytes?))
            .collect()
    }

    /// Direct children of a node (or the top of the tree), in sibling order
    pub fn children(&self, vendor: &str, root: &CategoryId, parent: Option<Ulid>) -> Result<Vec<VendorPriceNode>> {
        let mut children = Vec::new();
        for id in self.by_parent.scan_prefix(keys::parent_index_prefix(vendor, root, parent)).values() {
            let id = id?;
            let bytes = <[u8; 16]>::try_from(&id[..])
                .map_err(|_| StoreError::Corrupt("malformed entry in price node parent index".to_string()))?;
            let id = Ulid::from_bytes(bytes);
            if let Some(node) = self.node_by_id(id)? {
                children.push(node);
            }
        }
        children.sort_by(|a, b| (a.sequence, &a.category_id).cmp(&(b.sequence, &b.category_id)));
        Ok(children)
    }

    /// Nested view of a vendor tree, including inactive nodes
    pub fn price_tree(&self, vendor: &str, root: &CategoryId) -> Result<Vec<PriceTreeNode>> {
        let mut visited = AHashSet::new();
        self.subtree(vendor, root, None, &mut visited)
    }

    fn subtree(
        &self,
        vendor: &str,
        root: &CategoryId,
        parent: Option<Ulid>,
        visited: &mut AHashSet<Ulid>,
    ) -> Result<Vec<PriceTreeNode>> {
        let mut out = Vec::new();
        for node in self.children(vendor, root, parent)? {
            if !visited.insert(node.id) {
                return Err(StoreError::Corrupt(format!("price tree for {vendor}/{root} is not acyclic")));
            }
            let children = self.subtree(vendor, root, Some(node.id), visited)?;
            out.push(PriceTreeNode { node, children });
        }
        Ok(out)
    }

    /// Active leaf categories in tree pre-order
    pub fn active_leaf_ids(&self, vendor: &str, root: &CategoryId) -> Result<Vec<CategoryId>> {
        fn walk(nodes: &[PriceTreeNode], out: &mut Vec<CategoryId>) {
            for entry in nodes.iter().filter(|e| e.node.is_active()) {
                if entry.node.is_leaf {
                    out.push(entry.node.category_id.clone());
                }
                walk(&entry.children, out);
            }
        }

        let mut out = Vec::new();
        walk(&self.price_tree(vendor, root)?, &mut out);
        Ok(out)
    }

    /// Apply a vendor edit to one node and mark it vendor-owned
    pub fn edit_node(
        &self,
        vendor: &str,
        root: &CategoryId,
        category: &CategoryId,
        edit: &VendorEdit,
    ) -> Result<VendorPriceNode> {
        let _guard = self.write_lock.lock();

        let mut node = self.node(vendor, root, category)?.ok_or_else(|| StoreError::NodeNotFound {
            vendor_id: vendor.to_string(),
            root_category_id: root.clone(),
            category_id: category.clone(),
        })?;

        if edit.is_empty() {
            return Ok(node);
        }
        if matches!(edit.price, Some(Some(_))) && !node.is_leaf {
            return Err(StoreError::PriceOnNonLeaf(category.clone()));
        }

        if let Some(price) = edit.price {
            node.price = price;
        }
        if let Some(terms) = &edit.terms {
            node.terms = terms.clone();
        }
        if let Some(visible) = edit.visible_to_user {
            node.visible_to_user = visible;
        }
        if let Some(visible) = edit.visible_to_vendor {
            node.visible_to_vendor = visible;
        }
        if let Some(status) = edit.pricing_status {
            node.pricing_status = status;
        }
        node.source = NodeSource::VendorEdit;
        node.updated_at_ms = now_ms();

        self.nodes
            .insert(keys::node_key(vendor, root, category), node.serialize()?)?;
        debug!("Vendor {} edited {} under {}", vendor, category, root);
        Ok(node)
    }

    /// Flush all trees to disk
    pub fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }
}
