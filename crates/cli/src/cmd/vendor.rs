//! Vendor registration

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use pricetree_cli::Config;

use crate::util;

pub async fn run_add(config: &Config, id: &str, name: &str) -> Result<()> {
    let vendor = util::api_client(config)?
        .register_vendor(id, name)
        .await
        .with_context(|| format!("Failed to register vendor {id}"))?;
    println!("{} Vendor {} ({})", "✓".green(), vendor.id.cyan(), vendor.name);
    Ok(())
}

pub async fn run_ls(config: &Config) -> Result<()> {
    let vendors = util::api_client(config)?
        .vendors()
        .await
        .context("Failed to list vendors")?;
    for vendor in vendors {
        println!("{}  {}", vendor.id.cyan(), vendor.name);
    }
    Ok(())
}
