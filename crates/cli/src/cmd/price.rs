//! Vendor price edits

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use pricetree_cli::Config;
use pricetree_core::CategoryId;
use pricetree_store::{PricingStatus, VendorEdit};

use crate::util;

pub fn build_edit(
    price: Option<f64>,
    clear_price: bool,
    terms: Option<String>,
    visible_to_user: Option<bool>,
    visible_to_vendor: Option<bool>,
    status: Option<PricingStatus>,
) -> VendorEdit {
    VendorEdit {
        price: if clear_price { Some(None) } else { price.map(Some) },
        terms,
        visible_to_user,
        visible_to_vendor,
        pricing_status: status,
    }
}

pub async fn run_set(
    config: &Config,
    vendor: &str,
    root: CategoryId,
    category: CategoryId,
    edit: VendorEdit,
) -> Result<()> {
    if edit.is_empty() {
        anyhow::bail!("Nothing to change: pass --price, --clear-price, --terms, --visible-to-* or --status");
    }

    let node = util::api_client(config)?
        .edit_node(vendor, &root, &category, &edit)
        .await
        .with_context(|| format!("Failed to edit {category} for vendor {vendor}"))?;

    let price = node.price.map(|p| format!("{p:.2}")).unwrap_or_else(|| "none".to_string());
    println!("{} {} price={} terms={:?}", "✓".green(), node.name.cyan(), price, node.terms);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_price_wins_over_missing_price() {
        let edit = build_edit(None, true, None, None, None, None);
        assert_eq!(edit.price, Some(None));
        assert!(build_edit(None, false, None, None, None, None).is_empty());
        assert_eq!(build_edit(Some(5.0), false, None, None, None, None).price, Some(Some(5.0)));
    }
}
