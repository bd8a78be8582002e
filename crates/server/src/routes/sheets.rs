//! Pricing sheet endpoints.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use pricetree_store::SheetRow;
use serde::Deserialize;
use serde_json::{Map, Value};
use ulid::Ulid;

use super::blocking;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Sheet reads.
pub fn routes() -> Router<AppState> {
    Router::new().route("/sheets/:category_name/rows", get(list_rows))
}

pub fn writes() -> Router<AppState> {
    Router::new()
        .route("/sheets/:category_name/rows", post(upsert_row))
        .route("/sheets/:category_name/rows/:row_id", delete(delete_row))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorQuery {
    pub vendor_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertRow {
    #[serde(default)]
    pub row_id: Option<Ulid>,
    pub cells: Map<String, Value>,
}

pub async fn list_rows(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    query: Result<Query<VendorQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<SheetRow>>> {
    let Path(category_name) = path?;
    let Query(q) = query?;
    blocking(&state, move |book| book.sheets().rows(&category_name, &q.vendor_id))
        .await
        .map(Json)
}

pub async fn upsert_row(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    query: Result<Query<VendorQuery>, QueryRejection>,
    payload: Result<Json<UpsertRow>, JsonRejection>,
) -> ApiResult<Json<SheetRow>> {
    let Path(category_name) = path?;
    let Query(q) = query?;
    let Json(row) = payload?;
    blocking(&state, move |book| {
        book.sheets()
            .upsert_row(&category_name, &q.vendor_id, row.row_id, row.cells)
    })
    .await
    .map(Json)
}

pub async fn delete_row(
    State(state): State<AppState>,
    path: Result<Path<(String, Ulid)>, PathRejection>,
    query: Result<Query<VendorQuery>, QueryRejection>,
) -> ApiResult<StatusCode> {
    let Path((category_name, row_id)) = path?;
    let Query(q) = query?;
    let removed = blocking(&state, move |book| {
        book.sheets().delete_row(&category_name, &q.vendor_id, row_id)
    })
    .await?;

    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!("no row {row_id}")))
    }
}
