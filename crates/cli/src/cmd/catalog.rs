//! Catalog import and listing

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use pricetree_cli::Config;
use pricetree_core::{CategoryId, CategoryRecord};
use std::path::Path;

use crate::util;

/// Replace the server catalog from a JSON array of category records
pub async fn run_import(config: &Config, file: &Path) -> Result<()> {
    let text = std::fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let records: Vec<CategoryRecord> =
        serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", file.display()))?;

    let client = util::api_client(config)?;
    let imported = client
        .import_catalog(&records)
        .await
        .context("Failed to import catalog")?;
    println!("{} Imported {} categories", "✓".green(), imported);
    Ok(())
}

pub async fn run_ls(config: &Config, parent: Option<String>) -> Result<()> {
    let parent = parent.map(CategoryId::from);
    let client = util::api_client(config)?;
    let children = client
        .categories(parent.as_ref())
        .await
        .context("Failed to list categories")?;

    if children.is_empty() {
        println!("{}", "No categories".dimmed());
    }
    for record in children {
        println!("{}  {}", record.id.cyan(), record.name);
    }
    Ok(())
}
