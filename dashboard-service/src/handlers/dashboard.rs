//! Dashboard overview handlers: summary cards, latest invoices, revenue chart.

use crate::models::{CardData, LatestInvoice, Revenue};
use crate::startup::AppState;
use axum::{extract::State, Json};
use dashboard_core::error::AppError;

pub async fn cards(State(state): State<AppState>) -> Result<Json<CardData>, AppError> {
    Ok(Json(state.db.fetch_card_data().await?))
}

pub async fn latest_invoices(
    State(state): State<AppState>,
) -> Result<Json<Vec<LatestInvoice>>, AppError> {
    Ok(Json(state.db.fetch_latest_invoices().await?))
}

pub async fn revenue(State(state): State<AppState>) -> Result<Json<Vec<Revenue>>, AppError> {
    Ok(Json(state.db.fetch_revenue().await?))
}
