//! Inventory endpoints.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::error::Result;
use crate::models::{InventoryDraft, InventoryItem};
use crate::services::InventoryLedger;
use crate::state::AppState;

/// `POST /inventory`
pub async fn create(
    State(state): State<AppState>,
    payload: std::result::Result<Json<InventoryDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<InventoryItem>)> {
    let Json(draft) = payload?;
    let item = InventoryLedger::new(state.store()).create(draft).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// `GET /inventory`
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<InventoryItem>>> {
    let items = InventoryLedger::new(state.store()).list().await?;
    Ok(Json(items))
}
