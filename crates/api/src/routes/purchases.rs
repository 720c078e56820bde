//! Purchase endpoints.

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};

use bizdesk_core::PurchaseId;

use crate::error::Result;
use crate::models::{Invoice, Purchase, PurchaseDraft};
use crate::services::PurchaseRecorder;
use crate::state::AppState;

/// `POST /purchases`
///
/// Body names the customer either by `customerId` or with inline `customer`
/// details (found or created by email/phone), never both.
pub async fn create(
    State(state): State<AppState>,
    payload: std::result::Result<Json<PurchaseDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<Purchase>)> {
    let Json(draft) = payload?;
    let purchase = PurchaseRecorder::new(state.store()).record(draft).await?;
    Ok((StatusCode::CREATED, Json(purchase)))
}

/// `GET /purchases`
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Purchase>>> {
    let purchases = PurchaseRecorder::new(state.store()).list().await?;
    Ok(Json(purchases))
}

/// `GET /purchases/{id}/invoice`
pub async fn invoice(
    State(state): State<AppState>,
    id: std::result::Result<Path<PurchaseId>, PathRejection>,
) -> Result<Json<Invoice>> {
    let Path(id) = id?;
    let invoice = PurchaseRecorder::new(state.store()).invoice(id).await?;
    Ok(Json(invoice))
}
