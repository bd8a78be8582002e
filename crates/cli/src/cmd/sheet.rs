//! Pricing sheet rows

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use pricetree_cli::Config;
use serde_json::{Map, Value};
use ulid::Ulid;

use crate::util;

pub async fn run_ls(config: &Config, sheet: &str, vendor: &str) -> Result<()> {
    let rows = util::api_client(config)?
        .sheet_rows(sheet, vendor)
        .await
        .with_context(|| format!("Failed to list rows of sheet '{sheet}'"))?;

    if rows.is_empty() {
        println!("{}", "No rows".dimmed());
    }
    for row in rows {
        println!("{}  {}", row.row_id.to_string().cyan(), Value::Object(row.cells));
    }
    Ok(())
}

pub async fn run_put(config: &Config, sheet: &str, vendor: &str, cells: &str, row: Option<&str>) -> Result<()> {
    let cells: Map<String, Value> = serde_json::from_str(cells).context("--cells must be a JSON object")?;
    let row_id = row.map(parse_row_id).transpose()?;

    let row = util::api_client(config)?
        .upsert_sheet_row(sheet, vendor, row_id, cells)
        .await
        .with_context(|| format!("Failed to write row to sheet '{sheet}'"))?;
    println!("{} Row {}", "✓".green(), row.row_id);
    Ok(())
}

pub async fn run_rm(config: &Config, sheet: &str, vendor: &str, row: &str) -> Result<()> {
    let row_id = parse_row_id(row)?;
    util::api_client(config)?
        .delete_sheet_row(sheet, vendor, row_id)
        .await
        .with_context(|| format!("Failed to delete row {row_id}"))?;
    println!("{} Deleted row {}", "✓".green(), row_id);
    Ok(())
}

fn parse_row_id(row: &str) -> Result<Ulid> {
    Ulid::from_string(row).with_context(|| format!("Invalid row id '{row}'"))
}
