//! Customer list handlers.

use crate::models::{CustomerField, FormattedCustomerRow};
use crate::startup::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use dashboard_core::error::AppError;
use serde::Deserialize;

#[derive(Deserialize)]
pub struct TableParams {
    pub query: Option<String>,
}

pub async fn list_customers(
    State(state): State<AppState>,
) -> Result<Json<Vec<CustomerField>>, AppError> {
    Ok(Json(state.db.fetch_customers().await?))
}

pub async fn customers_table(
    State(state): State<AppState>,
    Query(params): Query<TableParams>,
) -> Result<Json<Vec<FormattedCustomerRow>>, AppError> {
    let query = params.query.unwrap_or_default();
    Ok(Json(state.db.fetch_filtered_customers(&query).await?))
}
