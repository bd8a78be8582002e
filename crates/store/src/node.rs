//! Vendor pricing node types

use pricetree_core::CategoryId;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Whether a node is currently part of the vendor's priced tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PricingStatus {
    Active,
    Inactive,
}

/// Who last owned the vendor-controlled fields of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeSource {
    MasterSync,
    VendorEdit,
}

/// A registered vendor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    pub id: String,
    pub name: String,
    pub created_at_ms: u64,
}

/// One category position inside one vendor's pricing tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorPriceNode {
    pub id: Ulid,
    pub vendor_id: String,
    pub root_category_id: CategoryId,
    pub category_id: CategoryId,
    pub parent_category_id: Option<CategoryId>,
    pub name: String,
    pub parent_vendor_price_node_id: Option<Ulid>,
    /// Depth below the root category; its direct children are level 1
    pub level: u32,
    pub is_leaf: bool,
    pub price: Option<f64>,
    pub pricing_status: PricingStatus,
    pub terms: String,
    pub visible_to_user: bool,
    pub visible_to_vendor: bool,
    /// Position among catalog siblings
    pub sequence: u32,
    pub image_url: Option<String>,
    pub icon_url: Option<String>,
    pub source: NodeSource,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
}

impl VendorPriceNode {
    pub fn is_active(&self) -> bool {
        self.pricing_status == PricingStatus::Active
    }

    /// Reset the vendor-controlled fields to master defaults
    pub(crate) fn reset_vendor_fields(&mut self) {
        self.price = None;
        self.terms = String::new();
        self.visible_to_user = true;
        self.visible_to_vendor = true;
    }

    /// Serialize for storage
    pub(crate) fn serialize(&self) -> crate::Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(crate::StoreError::codec("price node"))
    }

    /// Deserialize from storage
    pub(crate) fn deserialize(bytes: &[u8]) -> crate::Result<Self> {
        serde_json::from_slice(bytes).map_err(crate::StoreError::codec("price node"))
    }
}

/// A vendor-side change to one node
///
/// Absent fields are left as they are. `price: Some(None)` clears the price.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorEdit {
    #[serde(default, with = "double_option", skip_serializing_if = "Option::is_none")]
    pub price: Option<Option<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible_to_user: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible_to_vendor: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing_status: Option<PricingStatus>,
}

impl VendorEdit {
    pub fn price(price: f64) -> Self {
        Self {
            price: Some(Some(price)),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// `null` means "clear", a missing field means "leave alone"
mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Option<f64>>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Option<f64>>, D::Error> {
        Option::<f64>::deserialize(deserializer).map(Some)
    }
}

/// Nested view of a vendor tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceTreeNode {
    #[serde(flatten)]
    pub node: VendorPriceNode,
    pub children: Vec<PriceTreeNode>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_wire_names() {
        assert_eq!(serde_json::to_string(&NodeSource::MasterSync).unwrap(), "\"MASTER_SYNC\"");
        assert_eq!(serde_json::to_string(&NodeSource::VendorEdit).unwrap(), "\"VENDOR_EDIT\"");
        assert_eq!(serde_json::to_string(&PricingStatus::Inactive).unwrap(), "\"Inactive\"");
    }

    #[test]
    fn test_edit_distinguishes_null_from_missing() {
        let clear: VendorEdit = serde_json::from_str(r#"{"price": null}"#).unwrap();
        assert_eq!(clear.price, Some(None));

        let untouched: VendorEdit = serde_json::from_str(r#"{"terms": "cash only"}"#).unwrap();
        assert_eq!(untouched.price, None);
        assert_eq!(untouched.terms.as_deref(), Some("cash only"));

        let set: VendorEdit = serde_json::from_str(r#"{"price": 12.5, "visibleToUser": false}"#).unwrap();
        assert_eq!(set.price, Some(Some(12.5)));
        assert_eq!(set.visible_to_user, Some(false));
        assert!(VendorEdit::default().is_empty());
    }
}
