//! Show a vendor's stored price nodes

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use pricetree_cli::{render, Config};
use pricetree_core::CategoryId;
use pricetree_store::PricingStatus;

use crate::util;

pub async fn run(config: &Config, vendor: &str, root: CategoryId, flat: bool) -> Result<()> {
    let client = util::api_client(config)?;

    if !flat {
        let tree = client
            .price_tree(vendor, &root)
            .await
            .with_context(|| format!("Failed to load price tree for {vendor} under {root}"))?;
        if tree.is_empty() {
            println!("{}", "No price nodes yet; run 'ptree sync' first".dimmed());
        }
        render::print_price_tree(&tree);
        return Ok(());
    }

    let nodes = client
        .nodes(vendor, &root)
        .await
        .with_context(|| format!("Failed to load price nodes for {vendor} under {root}"))?;

    println!(
        "{:<5} {:<4} {:<24} {:<10} {:<9} {}",
        "LEVEL".bold(),
        "SEQ".bold(),
        "CATEGORY".bold(),
        "PRICE".bold(),
        "STATUS".bold(),
        "SOURCE".bold()
    );
    for node in nodes {
        let price = node.price.map(|p| format!("{p:.2}")).unwrap_or_else(|| "-".to_string());
        let status = match node.pricing_status {
            PricingStatus::Active => "active",
            PricingStatus::Inactive => "inactive",
        };
        let source = match node.source {
            pricetree_store::NodeSource::MasterSync => "master",
            pricetree_store::NodeSource::VendorEdit => "vendor",
        };
        println!(
            "{:<5} {:<4} {:<24} {:<10} {:<9} {}",
            node.level,
            node.sequence,
            node.category_id.as_str(),
            price,
            status,
            source
        );
    }
    Ok(())
}
