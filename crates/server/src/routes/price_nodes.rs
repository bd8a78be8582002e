//! Vendor price node endpoints.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use pricetree_core::{CategoryId, SyncRequest, SyncResponse};
use pricetree_store::{PriceTreeNode, VendorEdit, VendorPriceNode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::blocking;
use crate::error::ApiResult;
use crate::state::AppState;

/// Price node reads.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/vendor-price-nodes", get(list_nodes))
        .route("/vendor-price-nodes/tree", get(price_tree))
        .route("/vendor-price-nodes/active-leaves", get(active_leaves))
}

/// Sync and vendor edits.
pub fn writes() -> Router<AppState> {
    Router::new()
        .route("/vendor-price-nodes/sync", post(sync))
        .route(
            "/vendor-price-nodes/:vendor_id/:root_category_id/:category_id",
            patch(edit_node),
        )
}

/// Identifies one vendor tree.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorTreeQuery {
    pub vendor_id: String,
    pub root_category_id: CategoryId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveLeaves {
    pub active_leaf_category_ids: Vec<CategoryId>,
}

/// `POST /vendor-price-nodes/sync` reconciles the posted active leaves.
pub async fn sync(
    State(state): State<AppState>,
    payload: Result<Json<SyncRequest>, JsonRejection>,
) -> ApiResult<Json<SyncResponse>> {
    let Json(request) = payload?;
    debug!(
        "Sync request for vendor {} under {} with {} leaves",
        request.vendor_id,
        request.root_category_id,
        request.active_leaf_category_ids.len()
    );
    let report = blocking(&state, move |book| book.sync(&request)).await?;
    Ok(Json(SyncResponse { success: true, report }))
}

/// `GET /vendor-price-nodes?vendorId&rootCategoryId` returns the flat node list.
pub async fn list_nodes(
    State(state): State<AppState>,
    query: Result<Query<VendorTreeQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<VendorPriceNode>>> {
    let Query(q) = query?;
    blocking(&state, move |book| book.nodes(&q.vendor_id, &q.root_category_id))
        .await
        .map(Json)
}

/// `GET /vendor-price-nodes/tree` returns the nested view.
pub async fn price_tree(
    State(state): State<AppState>,
    query: Result<Query<VendorTreeQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<PriceTreeNode>>> {
    let Query(q) = query?;
    blocking(&state, move |book| book.price_tree(&q.vendor_id, &q.root_category_id))
        .await
        .map(Json)
}

/// `GET /vendor-price-nodes/active-leaves`
pub async fn active_leaves(
    State(state): State<AppState>,
    query: Result<Query<VendorTreeQuery>, QueryRejection>,
) -> ApiResult<Json<ActiveLeaves>> {
    let Query(q) = query?;
    let ids = blocking(&state, move |book| book.active_leaf_ids(&q.vendor_id, &q.root_category_id)).await?;
    Ok(Json(ActiveLeaves {
        active_leaf_category_ids: ids,
    }))
}

/// `PATCH /vendor-price-nodes/:vendorId/:rootCategoryId/:categoryId`
pub async fn edit_node(
    State(state): State<AppState>,
    path: Result<Path<(String, CategoryId, CategoryId)>, PathRejection>,
    payload: Result<Json<VendorEdit>, JsonRejection>,
) -> ApiResult<Json<VendorPriceNode>> {
    let Path((vendor_id, root_category_id, category_id)) = path?;
    let Json(edit) = payload?;
    blocking(&state, move |book| {
        book.edit_node(&vendor_id, &root_category_id, &category_id, &edit)
    })
    .await
    .map(Json)
}
