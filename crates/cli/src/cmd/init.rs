//! Initialize configuration and the local data directory

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use pricetree_cli::config::{self, Config};

pub async fn run(config: &Config) -> Result<()> {
    let config_path = config::config_file_path().context("Could not determine config file path")?;
    if config::init_if_missing()? {
        println!("{} Created config file at: {}", "✓".green(), config_path.display());
    } else {
        println!("{} Config file already exists: {}", "•".dimmed(), config_path.display());
    }

    let data_dir = config.data_dir()?;
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;
    println!("{} Data directory: {}", "✓".green(), data_dir.display());

    println!("\n{}", "Next steps:".bold());
    println!("  ptree serve");
    println!("  ptree catalog import categories.json");
    println!("  ptree vendor add <id> <name>");
    Ok(())
}
