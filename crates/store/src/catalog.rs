//! Master category catalog stored in sled

use crate::error::StoreError;
use crate::keys;
use crate::Result;
use ahash::{AHashMap, AHashSet};
use async_trait::async_trait;
use parking_lot::Mutex;
use pricetree_core::{CategoryFetcher, CategoryId, CategoryRecord, FetchError};
use serde::{Deserialize, Serialize};
use sled::transaction::TransactionResult;
use sled::{Batch, Db, Transactional, Tree};
use std::sync::Arc;
use tracing::info;

/// Stored catalog value: the record plus its position among siblings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CatalogEntry {
    pub sequence: u32,
    pub record: CategoryRecord,
}

impl CatalogEntry {
    fn deserialize(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(StoreError::codec("catalog entry"))
    }
}

/// The master catalog: `catalog` (id -> entry) and `catalog_children`
/// (parent \0 seq -> id)
#[derive(Clone)]
pub struct CatalogStore {
    records: Tree,
    children: Tree,
    /// Shared with the pricebook so a replace never races a sync
    write_lock: Arc<Mutex<()>>,
}

impl CatalogStore {
    pub(crate) fn new(db: &Db, write_lock: Arc<Mutex<()>>) -> Result<Self> {
        Ok(Self {
            records: db.open_tree("catalog")?,
            children: db.open_tree("catalog_children")?,
            write_lock,
        })
    }

    /// Replace the whole catalog atomically
    ///
    /// Records are validated first: ids must be usable as keys and unique,
    /// every declared parent must be present, and parent chains must end at
    /// the top level. Sibling order is the order of `records`.
    pub fn replace_all(&self, records: Vec<CategoryRecord>) -> Result<usize> {
        validate(&records)?;

        let _guard = self.write_lock.lock();

        let mut record_batch = Batch::default();
        let mut child_batch = Batch::default();
        for key in self.records.iter().keys() {
            record_batch.remove(key?);
        }
        for key in self.children.iter().keys() {
            child_batch.remove(key?);
        }

        let mut next_seq: AHashMap<Option<CategoryId>, u32> = AHashMap::new();
        for record in &records {
            let seq = next_seq.entry(record.parent_id.clone()).or_insert(0);
            let entry = CatalogEntry {
                sequence: *seq,
                record: record.clone(),
            };
            let value = serde_json::to_vec(&entry).map_err(StoreError::codec("catalog entry"))?;
            record_batch.insert(record.id.as_str().as_bytes(), value);
            child_batch.insert(
                keys::child_key(record.parent_id.as_ref(), *seq),
                record.id.as_str().as_bytes(),
            );
            *seq += 1;
        }

        let result: TransactionResult<(), StoreError> =
            (&self.records, &self.children).transaction(|(r, c)| {
                r.apply_batch(&record_batch)?;
                c.apply_batch(&child_batch)?;
                Ok(())
            });
        result?;

        info!("Imported catalog with {} categories", records.len());
        Ok(records.len())
    }

    /// Look up one category
    pub fn get(&self, id: &CategoryId) -> Result<Option<CategoryRecord>> {
        Ok(self.entry(id)?.map(|e| e.record))
    }

    pub(crate) fn entry(&self, id: &CategoryId) -> Result<Option<CatalogEntry>> {
        match self.records.get(id.as_str().as_bytes())? {
            Some(bytes) => Ok(Some(CatalogEntry::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn contains(&self, id: &CategoryId) -> Result<bool> {
        Ok(self.records.contains_key(id.as_str().as_bytes())?)
    }

    /// Direct children in import order; `None` lists the top level
    pub fn children(&self, parent: Option<&CategoryId>) -> Result<Vec<CategoryRecord>> {
        let mut out = Vec::new();
        for item in self.children.scan_prefix(keys::child_prefix(parent)) {
            let (_, id) = item?;
            let id = CategoryId::new(String::from_utf8_lossy(&id).into_owned());
            match self.get(&id)? {
                Some(record) => out.push(record),
                None => {
                    return Err(StoreError::Corrupt(format!(
                        "child index references missing category {id}"
                    )))
                }
            }
        }
        Ok(out)
    }

    pub fn has_children(&self, id: &CategoryId) -> Result<bool> {
        match self.children.scan_prefix(keys::child_prefix(Some(id))).next() {
            Some(item) => item.map(|_| true).map_err(Into::into),
            None => Ok(false),
        }
    }

    /// Ancestors of `id`, nearest first, ending at a top-level category
    pub fn parent_chain(&self, id: &CategoryId) -> Result<Vec<CategoryId>> {
        let mut chain = Vec::new();
        let mut current = match self.get(id)? {
            Some(record) => record.parent_id,
            None => return Ok(chain),
        };

        let mut visited: AHashSet<CategoryId> = AHashSet::new();
        visited.insert(id.clone());
        while let Some(parent) = current {
            if !visited.insert(parent.clone()) {
                return Err(StoreError::Corrupt(format!("parent chain of {id} does not terminate")));
            }
            current = self.get(&parent)?.and_then(|r| r.parent_id);
            chain.push(parent);
        }
        Ok(chain)
    }

    /// Number of categories; walks the whole tree
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl CategoryFetcher for CatalogStore {
    async fn children(&self, parent: Option<&CategoryId>) -> std::result::Result<Vec<CategoryRecord>, FetchError> {
        CatalogStore::children(self, parent).map_err(FetchError::from)
    }
}

fn validate(records: &[CategoryRecord]) -> Result<()> {
    let mut parents: AHashMap<&CategoryId, Option<&CategoryId>> = AHashMap::with_capacity(records.len());
    for record in records {
        if !record.id.is_valid() {
            return Err(StoreError::InvalidCatalog(format!("invalid category id {:?}", record.id)));
        }
        if record.parent_id.as_ref() == Some(&record.id) {
            return Err(StoreError::InvalidCatalog(format!("category {} is its own parent", record.id)));
        }
        if parents.insert(&record.id, record.parent_id.as_ref()).is_some() {
            return Err(StoreError::InvalidCatalog(format!("duplicate category {}", record.id)));
        }
    }

    for record in records {
        if let Some(parent) = &record.parent_id {
            if !parents.contains_key(parent) {
                return Err(StoreError::InvalidCatalog(format!(
                    "category {} references missing parent {parent}",
                    record.id
                )));
            }
        }
    }

    // Every chain must reach the top level
    let mut grounded: AHashSet<&CategoryId> = AHashSet::with_capacity(records.len());
    for record in records {
        let mut path = Vec::new();
        let mut current = Some(&record.id);
        while let Some(id) = current {
            if grounded.contains(id) {
                break;
            }
            if path.contains(&id) {
                return Err(StoreError::InvalidCatalog(format!("parent cycle through {id}")));
            }
            path.push(id);
            current = parents.get(id).copied().flatten();
        }
        grounded.extend(path);
    }

    Ok(())
}
