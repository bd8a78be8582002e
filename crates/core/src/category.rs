//! Category records (from the master catalog) and derived tree nodes

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Opaque identifier of a master catalog category
#[derive(Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(String);

impl CategoryId {
    /// Create an id from any string-like value
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Ids are non-empty and must not contain NUL (used as a key separator by stores)
    pub fn is_valid(&self) -> bool {
        !self.0.is_empty() && !self.0.contains('\0')
    }
}

impl fmt::Debug for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CategoryId({})", self.0)
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CategoryId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for CategoryId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for CategoryId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CategoryId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A category as returned by the catalog API
///
/// Fields this crate does not interpret are kept in `extra` so they
/// survive a round trip through the tree and the stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRecord {
    /// Catalog-unique id
    pub id: CategoryId,
    /// Display name
    pub name: String,
    /// Optional image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Catalog parent (None for top-level categories)
    #[serde(default)]
    pub parent_id: Option<CategoryId>,
    /// Any other fields the catalog sends
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl CategoryRecord {
    /// Create a record with no image and no extra fields
    pub fn new(id: impl Into<CategoryId>, name: impl Into<String>, parent_id: Option<CategoryId>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            image_url: None,
            parent_id,
            extra: serde_json::Map::new(),
        }
    }

    /// Look up a string-valued extra field (e.g. `iconUrl`)
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(serde_json::Value::as_str)
    }
}

/// One node of the in-memory category tree
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryNode {
    pub id: CategoryId,
    pub data: CategoryRecord,
    /// Direct children, in catalog order
    pub children: Vec<CategoryId>,
    /// Presentation-only flag
    pub expanded: bool,
}

impl CategoryNode {
    /// Wrap a freshly fetched record; children are linked later
    pub fn from_record(data: CategoryRecord) -> Self {
        Self {
            id: data.id.clone(),
            data,
            children: Vec::new(),
            expanded: false,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}
