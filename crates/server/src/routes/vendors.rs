//! Vendor registry endpoints.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use pricetree_store::Vendor;
use serde::{Deserialize, Serialize};

use super::blocking;
use crate::error::ApiResult;
use crate::state::AppState;

/// Vendor reads.
pub fn routes() -> Router<AppState> {
    Router::new().route("/vendors", get(list_vendors))
}

pub fn writes() -> Router<AppState> {
    Router::new().route("/vendors", post(register_vendor))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterVendor {
    pub id: String,
    pub name: String,
}

pub async fn list_vendors(State(state): State<AppState>) -> ApiResult<Json<Vec<Vendor>>> {
    blocking(&state, |book| book.vendors()).await.map(Json)
}

/// `POST /vendors` is idempotent per id.
pub async fn register_vendor(
    State(state): State<AppState>,
    payload: Result<Json<RegisterVendor>, JsonRejection>,
) -> ApiResult<Json<Vendor>> {
    let Json(req) = payload?;
    blocking(&state, move |book| book.register_vendor(&req.id, &req.name))
        .await
        .map(Json)
}
