//! Customer endpoints.

use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};

use super::SearchQuery;
use crate::error::Result;
use crate::models::{Customer, CustomerDetails};
use crate::services::CustomerDirectory;
use crate::state::AppState;

/// `POST /customers`
pub async fn create(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CustomerDetails>, JsonRejection>,
) -> Result<(StatusCode, Json<Customer>)> {
    let Json(details) = payload?;
    let customer = CustomerDirectory::new(state.store()).create(details).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

/// `GET /customers?searchTerm=`
pub async fn index(
    State(state): State<AppState>,
    query: std::result::Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<Vec<Customer>>> {
    let Query(query) = query?;
    let customers = CustomerDirectory::new(state.store())
        .search(query.term())
        .await?;
    Ok(Json(customers))
}
