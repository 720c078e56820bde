//! Employee endpoints.

use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};

use super::SearchQuery;
use crate::error::Result;
use crate::models::{Employee, EmployeeDraft};
use crate::services::EmployeeRoster;
use crate::state::AppState;

/// `POST /employees`
///
/// Responds 200, not 201.
pub async fn create(
    State(state): State<AppState>,
    payload: std::result::Result<Json<EmployeeDraft>, JsonRejection>,
) -> Result<Json<Employee>> {
    let Json(draft) = payload?;
    let employee = EmployeeRoster::new(state.store()).create(draft).await?;
    Ok(Json(employee))
}

/// `GET /employees?searchTerm=`
pub async fn index(
    State(state): State<AppState>,
    query: std::result::Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<Vec<Employee>>> {
    let Query(query) = query?;
    let employees = EmployeeRoster::new(state.store())
        .search(query.term())
        .await?;
    Ok(Json(employees))
}
