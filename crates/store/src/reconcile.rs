//! Active-leaf reconciliation into a vendor tree
//!
//! A sync runs in two steps under the pricebook write lock. The plan step
//! validates the request and diffs the desired tree against a prefix scan
//! of the stored one. The apply step writes the diff in a single sled
//! transaction over the node tree and both indexes.

use crate::catalog::CatalogEntry;
use crate::error::{StoreError, SyncRejection};
use crate::keys;
use crate::node::{NodeSource, PricingStatus, VendorPriceNode};
use crate::pricebook::Pricebook;
use crate::{now_ms, Result};
use ahash::{AHashMap, AHashSet};
use pricetree_core::{CategoryId, SyncReport, SyncRequest};
use sled::transaction::{ConflictableTransactionError, TransactionResult};
use sled::{Batch, Transactional};
use tracing::{debug, info};
use ulid::Ulid;

/// One category the vendor tree must contain
struct Desired {
    entry: CatalogEntry,
    level: u32,
    is_leaf: bool,
}

/// Everything a sync will write
#[derive(Default)]
struct Plan {
    nodes: Batch,
    by_parent: Batch,
    by_id: Batch,
    /// Node keys inserted for the first time, re-checked inside the transaction
    inserted: Vec<(Vec<u8>, CategoryId)>,
    report: SyncReport,
}

impl Pricebook {
    /// Reconcile a vendor's active leaves into its pricing tree
    ///
    /// Every category on the path from each leaf up to (not including) the
    /// root ends up with exactly one Active node. Nodes that fall out of the
    /// selection become Inactive and keep their vendor edits.
    pub fn sync(&self, request: &SyncRequest) -> Result<SyncReport> {
        let _guard = self.write_lock.lock();

        let vendor = request.vendor_id.as_str();
        let root = &request.root_category_id;
        let (order, desired) = self.desired_tree(request)?;
        let plan = self.plan(vendor, root, &order, desired)?;
        let report = plan.report;
        self.apply(vendor, root, plan)?;

        info!(
            "Synced vendor {} under {}: {} created, {} updated, {} reactivated, {} deactivated, {} unchanged",
            vendor, root, report.created, report.updated, report.reactivated, report.deactivated, report.unchanged
        );
        Ok(report)
    }

    /// Validate the request and expand its leaves into the full desired set,
    /// returned top-down so parents precede their children
    fn desired_tree(&self, request: &SyncRequest) -> Result<(Vec<CategoryId>, AHashMap<CategoryId, Desired>)> {
        let vendor = request.vendor_id.as_str();
        let root = &request.root_category_id;

        if !keys::valid_vendor_id(vendor) {
            return Err(SyncRejection::InvalidVendorId.into());
        }
        if self.vendor(vendor)?.is_none() {
            return Err(SyncRejection::UnknownVendor(vendor.to_string()).into());
        }
        if !root.is_valid() {
            return Err(SyncRejection::InvalidCategoryId(root.clone()).into());
        }
        if !self.catalog().contains(root)? {
            return Err(SyncRejection::UnknownRoot(root.clone()).into());
        }

        let mut order = Vec::new();
        let mut desired: AHashMap<CategoryId, Desired> = AHashMap::new();
        let mut seen: AHashSet<&CategoryId> = AHashSet::new();

        for leaf in &request.active_leaf_category_ids {
            if !seen.insert(leaf) {
                continue;
            }
            if !leaf.is_valid() {
                return Err(SyncRejection::InvalidCategoryId(leaf.clone()).into());
            }
            if !self.catalog().contains(leaf)? {
                return Err(SyncRejection::UnknownCategory(leaf.clone()).into());
            }
            if self.catalog().has_children(leaf)? {
                return Err(SyncRejection::NotALeaf(leaf.clone()).into());
            }

            let chain = self.catalog().parent_chain(leaf)?;
            let below_root = chain.iter().position(|id| id == root).ok_or_else(|| SyncRejection::OutsideRoot {
                category: leaf.clone(),
                root: root.clone(),
            })?;

            // Path from the top (level 1) down to the leaf
            let mut path: Vec<CategoryId> = chain[..below_root].iter().rev().cloned().collect();
            path.push(leaf.clone());

            for (depth, id) in path.into_iter().enumerate() {
                if desired.contains_key(&id) {
                    continue;
                }
                let entry = self
                    .catalog()
                    .entry(&id)?
                    .ok_or_else(|| SyncRejection::UnknownCategory(id.clone()))?;
                desired.insert(
                    id.clone(),
                    Desired {
                        entry,
                        level: depth as u32 + 1,
                        is_leaf: &id == leaf,
                    },
                );
                order.push(id);
            }
        }

        Ok((order, desired))
    }

    /// Diff the desired set against the stored vendor tree
    fn plan(
        &self,
        vendor: &str,
        root: &CategoryId,
        order: &[CategoryId],
        mut desired: AHashMap<CategoryId, Desired>,
    ) -> Result<Plan> {
        let now = now_ms();
        let mut existing: AHashMap<CategoryId, VendorPriceNode> = self
            .scan_tree(vendor, root)?
            .into_iter()
            .map(|node| (node.category_id.clone(), node))
            .collect();

        let mut plan = Plan::default();
        let mut node_ids: AHashMap<CategoryId, Ulid> = AHashMap::with_capacity(order.len());

        for category in order {
            let Some(want) = desired.remove(category) else {
                continue;
            };
            let record = &want.entry.record;
            let parent_node = match &record.parent_id {
                Some(parent) if parent != root => node_ids.get(parent).copied(),
                _ => None,
            };
            let key = keys::node_key(vendor, root, category);

            match existing.remove(category) {
                Some(old) => {
                    let mut node = old.clone();
                    node.name = record.name.clone();
                    node.parent_category_id = record.parent_id.clone();
                    node.parent_vendor_price_node_id = parent_node;
                    node.level = want.level;
                    node.is_leaf = want.is_leaf;
                    node.sequence = want.entry.sequence;
                    node.image_url = record.image_url.clone();
                    node.icon_url = record.extra_str("iconUrl").map(str::to_string);
                    match node.source {
                        NodeSource::MasterSync => node.reset_vendor_fields(),
                        NodeSource::VendorEdit if !node.is_leaf => node.price = None,
                        NodeSource::VendorEdit => {}
                    }
                    node.pricing_status = PricingStatus::Active;
                    node_ids.insert(category.clone(), node.id);

                    if node == old {
                        plan.report.unchanged += 1;
                        continue;
                    }
                    if old.is_active() {
                        plan.report.updated += 1;
                    } else {
                        plan.report.reactivated += 1;
                    }

                    if old.parent_vendor_price_node_id != node.parent_vendor_price_node_id {
                        plan.by_parent.remove(keys::parent_index_key(
                            vendor,
                            root,
                            old.parent_vendor_price_node_id,
                            category,
                        ));
                        plan.by_parent.insert(
                            keys::parent_index_key(vendor, root, node.parent_vendor_price_node_id, category),
                            keys::id_key(node.id),
                        );
                    }
                    node.updated_at_ms = now;
                    plan.nodes.insert(key, node.serialize()?);
                }
                None => {
                    let node = VendorPriceNode {
                        id: Ulid::new(),
                        vendor_id: vendor.to_string(),
                        root_category_id: root.clone(),
                        category_id: category.clone(),
                        parent_category_id: record.parent_id.clone(),
                        name: record.name.clone(),
                        parent_vendor_price_node_id: parent_node,
                        level: want.level,
                        is_leaf: want.is_leaf,
                        price: None,
                        pricing_status: PricingStatus::Active,
                        terms: String::new(),
                        visible_to_user: true,
                        visible_to_vendor: true,
                        sequence: want.entry.sequence,
                        image_url: record.image_url.clone(),
                        icon_url: record.extra_str("iconUrl").map(str::to_string),
                        source: NodeSource::MasterSync,
                        created_at_ms: now,
                        updated_at_ms: now,
                    };
                    node_ids.insert(category.clone(), node.id);
                    plan.report.created += 1;

                    plan.by_parent.insert(
                        keys::parent_index_key(vendor, root, parent_node, category),
                        keys::id_key(node.id),
                    );
                    plan.by_id.insert(keys::id_key(node.id), key.clone());
                    plan.nodes.insert(key.clone(), node.serialize()?);
                    plan.inserted.push((key, category.clone()));
                }
            }
        }

        // Whatever is left fell out of the selection
        for (category, mut node) in existing {
            if !node.is_active() {
                plan.report.unchanged += 1;
                continue;
            }
            debug!("Deactivating {} for vendor {}", category, vendor);
            node.pricing_status = PricingStatus::Inactive;
            node.updated_at_ms = now;
            plan.nodes
                .insert(keys::node_key(vendor, root, &category), node.serialize()?);
            plan.report.deactivated += 1;
        }

        Ok(plan)
    }

    fn apply(&self, vendor: &str, root: &CategoryId, plan: Plan) -> Result<()> {
        let Plan {
            nodes,
            by_parent,
            by_id,
            inserted,
            ..
        } = plan;

        let result: TransactionResult<(), StoreError> =
            (&self.nodes, &self.by_parent, &self.by_id).transaction(|(tx_nodes, tx_parent, tx_id)| {
                for (key, category) in &inserted {
                    if tx_nodes.get(key)?.is_some() {
                        return Err(ConflictableTransactionError::Abort(StoreError::UniquenessViolation {
                            vendor_id: vendor.to_string(),
                            root_category_id: root.clone(),
                            category_id: category.clone(),
                        }));
                    }
                }
                tx_nodes.apply_batch(&nodes)?;
                tx_parent.apply_batch(&by_parent)?;
                tx_id.apply_batch(&by_id)?;
                Ok(())
            });
        result?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricetree_core::CategoryRecord;

    fn book() -> Pricebook {
        let book = Pricebook::open_temporary().unwrap();
        book.catalog()
            .replace_all(vec![
                CategoryRecord::new("sports", "Sports", None),
                CategoryRecord::new("badminton", "Badminton", Some("sports".into())),
            ])
            .unwrap();
        book.register_vendor("v1", "Vendor One").unwrap();
        book
    }

    #[test]
    fn test_apply_aborts_when_planned_insert_already_exists() {
        let book = book();
        let root = CategoryId::from("sports");
        let request = SyncRequest::new("v1", root.clone(), vec!["badminton".into()]);

        let (order, desired) = book.desired_tree(&request).unwrap();
        let plan = book.plan("v1", &root, &order, desired).unwrap();
        assert_eq!(plan.inserted.len(), 1);

        // A node for the same triple lands between planning and applying
        let key = keys::node_key("v1", &root, &"badminton".into());
        book.nodes.insert(key.clone(), b"occupied".to_vec()).unwrap();

        let err = book.apply("v1", &root, plan).unwrap_err();
        assert!(matches!(
            err,
            StoreError::UniquenessViolation { ref category_id, .. } if category_id.as_str() == "badminton"
        ));

        // Nothing from the aborted plan reached the indexes
        assert_eq!(book.nodes.get(&key).unwrap().as_deref(), Some(&b"occupied"[..]));
        assert!(book.by_id.is_empty());
        assert!(book.by_parent.is_empty());
    }
}
