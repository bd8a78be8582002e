//! Wide-row pricing sheets
//!
//! Each category gets a sheet partition named after it. Rows are free-form
//! cell maps owned by one vendor; no per-category schema exists.

use crate::error::StoreError;
use crate::keys;
use crate::{now_ms, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sled::{Db, Tree};
use tracing::debug;
use ulid::Ulid;

/// One row of a pricing sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetRow {
    pub row_id: Ulid,
    pub vendor_id: String,
    pub cells: Map<String, Value>,
    pub updated_at_ms: u64,
}

/// Normalize a category name into a partition key
///
/// Lowercases, maps every non-alphanumeric run to a single `_` and trims
/// underscores from both ends. Returns `None` when nothing is left.
pub fn partition_key(name: &str) -> Option<String> {
    let mut key = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_alphanumeric() {
            key.extend(c.to_lowercase());
        } else if !key.ends_with('_') {
            key.push('_');
        }
    }
    let key = key.trim_matches('_');
    (!key.is_empty()).then(|| key.to_string())
}

fn partition(name: &str) -> Result<String> {
    partition_key(name).ok_or_else(|| StoreError::InvalidSheetRow(format!("no usable sheet name in {name:?}")))
}

/// Rows keyed by partition \0 vendor \0 row id
#[derive(Clone)]
pub struct SheetStore {
    rows: Tree,
}

impl SheetStore {
    pub(crate) fn new(db: &Db) -> Result<Self> {
        Ok(Self {
            rows: db.open_tree("sheet_rows")?,
        })
    }

    /// Insert a row, or replace the cells of an existing one
    pub fn upsert_row(
        &self,
        sheet: &str,
        vendor: &str,
        row_id: Option<Ulid>,
        cells: Map<String, Value>,
    ) -> Result<SheetRow> {
        let partition = partition(sheet)?;
        if !keys::valid_vendor_id(vendor) {
            return Err(StoreError::InvalidVendorId);
        }
        if cells.is_empty() {
            return Err(StoreError::InvalidSheetRow("a row needs at least one cell".to_string()));
        }

        let row = SheetRow {
            row_id: row_id.unwrap_or_else(Ulid::new),
            vendor_id: vendor.to_string(),
            cells,
            updated_at_ms: now_ms(),
        };
        let value = serde_json::to_vec(&row).map_err(StoreError::codec("sheet row"))?;
        self.rows
            .insert(keys::sheet_row_key(&partition, vendor, row.row_id), value)?;
        debug!("Wrote row {} in sheet {} for {}", row.row_id, partition, vendor);
        Ok(row)
    }

    /// A vendor's rows in one sheet, ordered by row id
    pub fn rows(&self, sheet: &str, vendor: &str) -> Result<Vec<SheetRow>> {
        let partition = partition(sheet)?;
        self.rows
            .scan_prefix(keys::sheet_prefix(&partition, vendor))
            .values()
            .map(|bytes| serde_json::from_slice(&bytes?).map_err(StoreError::codec("sheet row")))
            .collect()
    }

    /// Remove a row; returns whether it existed
    pub fn delete_row(&self, sheet: &str, vendor: &str, row_id: Ulid) -> Result<bool> {
        let partition = partition(sheet)?;
        Ok(self
            .rows
            .remove(keys::sheet_row_key(&partition, vendor, row_id))?
            .is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> SheetStore {
        let db = sled::Config::new().temporary(true).open().unwrap();
        SheetStore::new(&db).unwrap()
    }

    fn cells(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_partition_key() {
        assert_eq!(partition_key("Sports Academies").as_deref(), Some("sports_academies"));
        assert_eq!(partition_key("  Hourly / Daily -- Rates ").as_deref(), Some("hourly_daily_rates"));
        assert_eq!(partition_key("Yoga2Go").as_deref(), Some("yoga2go"));
        assert_eq!(partition_key(" --- "), None);
        assert_eq!(partition_key(""), None);
    }

    #[test]
    fn test_rows_are_partitioned_by_sheet_and_vendor() {
        let sheets = store();
        sheets
            .upsert_row("Badminton", "v1", None, cells(json!({"court": 1, "rate": 400})))
            .unwrap();
        sheets
            .upsert_row("badminton", "v1", None, cells(json!({"court": 2, "rate": 450})))
            .unwrap();
        sheets
            .upsert_row("Badminton", "v2", None, cells(json!({"court": 1})))
            .unwrap();
        sheets.upsert_row("Tennis", "v1", None, cells(json!({"court": 9}))).unwrap();

        let rows = sheets.rows("BADMINTON", "v1").unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].row_id < rows[1].row_id);
        assert_eq!(sheets.rows("Badminton", "v2").unwrap().len(), 1);
    }

    #[test]
    fn test_upsert_replaces_and_delete_removes() {
        let sheets = store();
        let row = sheets.upsert_row("Pool", "v1", None, cells(json!({"lane": 1}))).unwrap();
        sheets
            .upsert_row("Pool", "v1", Some(row.row_id), cells(json!({"lane": 2})))
            .unwrap();

        let rows = sheets.rows("Pool", "v1").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].cells["lane"], 2);

        assert!(sheets.delete_row("Pool", "v1", row.row_id).unwrap());
        assert!(!sheets.delete_row("Pool", "v1", row.row_id).unwrap());
        assert!(sheets.rows("Pool", "v1").unwrap().is_empty());
    }

    #[test]
    fn test_rejects_unusable_input() {
        let sheets = store();
        assert!(matches!(
            sheets.upsert_row("???", "v1", None, cells(json!({"a": 1}))),
            Err(StoreError::InvalidSheetRow(_))
        ));
        assert!(matches!(
            sheets.upsert_row("Pool", "v1", None, Map::new()),
            Err(StoreError::InvalidSheetRow(_))
        ));
        assert!(matches!(
            sheets.upsert_row("Pool", "", None, cells(json!({"a": 1}))),
            Err(StoreError::InvalidVendorId)
        ));
    }
}
