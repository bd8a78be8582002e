//! Composite sled keys
//!
//! Components are joined with NUL. Ids are validated NUL-free before they
//! reach these helpers, so a prefix ending in NUL matches exactly one
//! parent component.

use pricetree_core::CategoryId;
use ulid::Ulid;

const SEP: u8 = 0;

fn join(parts: &[&[u8]]) -> Vec<u8> {
    let len = parts.iter().map(|p| p.len() + 1).sum();
    let mut key = Vec::with_capacity(len);
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            key.push(SEP);
        }
        key.extend_from_slice(part);
    }
    key
}

fn with_trailing_sep(mut key: Vec<u8>) -> Vec<u8> {
    key.push(SEP);
    key
}

/// `price_nodes`: vendor \0 root \0 category
pub fn node_key(vendor: &str, root: &CategoryId, category: &CategoryId) -> Vec<u8> {
    join(&[vendor.as_bytes(), root.as_str().as_bytes(), category.as_str().as_bytes()])
}

/// Prefix of every `price_nodes` key for one vendor tree
pub fn node_prefix(vendor: &str, root: &CategoryId) -> Vec<u8> {
    with_trailing_sep(join(&[vendor.as_bytes(), root.as_str().as_bytes()]))
}

/// `price_nodes_by_parent`: vendor \0 root \0 parent-node-ulid-or-empty \0 category
pub fn parent_index_key(vendor: &str, root: &CategoryId, parent: Option<Ulid>, category: &CategoryId) -> Vec<u8> {
    let mut key = parent_index_prefix(vendor, root, parent);
    key.extend_from_slice(category.as_str().as_bytes());
    key
}

/// Prefix of the index entries for one parent (None = top of the vendor tree)
pub fn parent_index_prefix(vendor: &str, root: &CategoryId, parent: Option<Ulid>) -> Vec<u8> {
    let parent = parent.map(|p| p.to_string()).unwrap_or_default();
    with_trailing_sep(join(&[
        vendor.as_bytes(),
        root.as_str().as_bytes(),
        parent.as_bytes(),
    ]))
}

/// `price_nodes_by_id`: the 16-byte ULID
pub fn id_key(id: Ulid) -> Vec<u8> {
    id.to_bytes().to_vec()
}

/// `catalog_children`: parent-or-empty \0 big-endian sequence
pub fn child_key(parent: Option<&CategoryId>, seq: u32) -> Vec<u8> {
    let mut key = child_prefix(parent);
    key.extend_from_slice(&seq.to_be_bytes());
    key
}

pub fn child_prefix(parent: Option<&CategoryId>) -> Vec<u8> {
    let parent = parent.map(CategoryId::as_str).unwrap_or("");
    with_trailing_sep(parent.as_bytes().to_vec())
}

/// `sheet_rows`: partition \0 vendor \0 row ulid
pub fn sheet_row_key(partition: &str, vendor: &str, row: Ulid) -> Vec<u8> {
    let mut key = sheet_prefix(partition, vendor);
    key.extend_from_slice(&row.to_bytes());
    key
}

pub fn sheet_prefix(partition: &str, vendor: &str) -> Vec<u8> {
    with_trailing_sep(join(&[partition.as_bytes(), vendor.as_bytes()]))
}

/// Vendor ids share the key space rules of category ids
pub fn valid_vendor_id(vendor: &str) -> bool {
    !vendor.is_empty() && !vendor.contains('\0')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_key_has_vendor_tree_prefix() {
        let root = CategoryId::from("r");
        let key = node_key("v", &root, &"c".into());
        assert!(key.starts_with(&node_prefix("v", &root)));
        assert!(!key.starts_with(&node_prefix("v", &"r2".into())));
        // "v" tree must not match vendor "v2"
        assert!(!node_key("v2", &root, &"c".into()).starts_with(&node_prefix("v", &root)));
    }

    #[test]
    fn test_top_level_index_prefix_is_distinct() {
        let root = CategoryId::from("r");
        let parent = Ulid::new();
        let child = parent_index_key("v", &root, Some(parent), &"c".into());
        assert!(!child.starts_with(&parent_index_prefix("v", &root, None)));
        assert!(parent_index_key("v", &root, None, &"c".into()).starts_with(&parent_index_prefix("v", &root, None)));
    }

    #[test]
    fn test_child_keys_sort_by_sequence() {
        let p = CategoryId::from("p");
        assert!(child_key(Some(&p), 2) < child_key(Some(&p), 10));
        assert!(child_key(None, 0).starts_with(&child_prefix(None)));
        assert!(!child_key(Some(&p), 0).starts_with(&child_prefix(None)));
    }
}
