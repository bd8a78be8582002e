//! Configuration management command
//!
//! Provides CLI interface to view and edit the config file.

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use pricetree_cli::config::{self, KEYS};

/// List all configuration values
pub async fn run_list() -> Result<()> {
    let config = config::load()?;
    let config_path = config::config_file_path().context("Could not determine config file path")?;

    println!("{}", "Configuration".bold());
    println!("{}: {}", "Location".dimmed(), config_path.display().dimmed());

    let mut section = "";
    for &key in KEYS {
        let (head, name) = key.split_once('.').unwrap_or(("", key));
        if head != section {
            println!("\n{}", format!("[{head}]").yellow());
            section = head;
        }
        let value = config.get(key)?;
        if value.is_empty() {
            println!("  {} = {}", name.cyan(), "(unset)".dimmed());
        } else {
            println!("  {} = {}", name.cyan(), value);
        }
    }

    println!("\n{}", "Valid Ranges:".bold());
    println!("  api.timeout_secs: 1-300");
    println!("  fetch.strategy: sequential | parallel");
    println!("  fetch.max_in_flight: 1-64");
    println!("  server.request_timeout_secs: 0-600 (0 = no timeout)");
    println!("  server.concurrency_limit: 0 = unlimited");

    Ok(())
}

/// Get a single configuration value
pub async fn run_get(key: &str) -> Result<()> {
    let config = config::load()?;
    println!("{}", config.get(key)?);
    Ok(())
}

/// Set a configuration value
pub async fn run_set(key: &str, value: &str) -> Result<()> {
    let mut config = config::load()?;
    config.set(key, value)?;
    config::save(&config)?;

    println!("{} {} = {}", "✓".green(), key.cyan(), value);
    if key.starts_with("server.") || key.starts_with("store.") {
        println!("{}", "Note: restart 'ptree serve' for changes to take effect".yellow());
    }
    Ok(())
}

/// Show the config file path and optionally create it
pub async fn run_path(create: bool) -> Result<()> {
    let config_path = config::config_file_path().context("Could not determine config file path")?;

    if create && !config_path.exists() {
        config::init_if_missing()?;
        println!("{} Created config file at: {}", "✓".green(), config_path.display());
    } else {
        println!("{}", config_path.display());
        if !config_path.exists() {
            println!("{}", "File does not exist. Use --create to create it.".yellow());
        }
    }

    Ok(())
}

/// Show example configuration
pub async fn run_example() -> Result<()> {
    println!("{}", config::example_config());
    Ok(())
}
