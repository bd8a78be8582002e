//! Master catalog endpoints.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::routing::{get, put};
use axum::{Json, Router};
use pricetree_core::{CategoryId, CategoryRecord};
use serde::{Deserialize, Serialize};

use super::blocking;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Category reads.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_children))
        .route("/categories/:id", get(get_category))
}

/// Catalog import.
pub fn writes() -> Router<AppState> {
    Router::new().route("/categories", put(replace_catalog))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildrenQuery {
    pub parent_id: Option<CategoryId>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ImportResponse {
    pub imported: usize,
}

/// `GET /categories?parentId=` lists direct children; no parent lists the top level.
pub async fn list_children(
    State(state): State<AppState>,
    query: Result<Query<ChildrenQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<CategoryRecord>>> {
    let Query(query) = query?;
    let children = blocking(&state, move |book| {
        if let Some(parent) = &query.parent_id {
            if !book.catalog().contains(parent)? {
                return Ok(None);
            }
        }
        book.catalog().children(query.parent_id.as_ref()).map(Some)
    })
    .await?;

    children
        .map(Json)
        .ok_or_else(|| ApiError::not_found("unknown parent category"))
}

/// `GET /categories/:id`
pub async fn get_category(
    State(state): State<AppState>,
    path: Result<Path<CategoryId>, PathRejection>,
) -> ApiResult<Json<CategoryRecord>> {
    let Path(id) = path?;
    let lookup = id.clone();
    blocking(&state, move |book| book.catalog().get(&lookup))
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("unknown category {id}")))
}

/// `PUT /categories` replaces the whole catalog with the given records.
pub async fn replace_catalog(
    State(state): State<AppState>,
    payload: Result<Json<Vec<CategoryRecord>>, JsonRejection>,
) -> ApiResult<Json<ImportResponse>> {
    let Json(records) = payload?;
    let imported = blocking(&state, move |book| book.catalog().replace_all(records)).await?;
    Ok(Json(ImportResponse { imported }))
}
