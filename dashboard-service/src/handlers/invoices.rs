//! Invoice table and mutation handlers.

use crate::models::{CreateInvoice, Invoice, InvoiceRow, UpdateInvoice};
use crate::startup::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use dashboard_core::error::AppError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Deserialize)]
pub struct ListParams {
    pub query: Option<String>,
    pub page: Option<u32>,
}

#[derive(Serialize)]
pub struct InvoicesPage {
    pub invoices: Vec<InvoiceRow>,
    pub total_pages: u64,
}

/// One page of the invoice search table plus the total page count for the
/// query. The page parameter is clamped to 1 here, upholding the database
/// layer's caller contract.
pub async fn list_invoices(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<InvoicesPage>, AppError> {
    let query = params.query.unwrap_or_default();
    let page = params.page.unwrap_or(1).max(1);

    let invoices = state.db.fetch_filtered_invoices(&query, page).await?;
    let total_pages = state.db.fetch_invoices_pages(&query).await?;

    Ok(Json(InvoicesPage {
        invoices,
        total_pages,
    }))
}

pub async fn get_invoice(
    State(state): State<AppState>,
    Path(invoice_id): Path<Uuid>,
) -> Result<Json<Invoice>, AppError> {
    let invoice = state
        .db
        .fetch_invoice_by_id(invoice_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Invoice not found")))?;

    Ok(Json(invoice))
}

pub async fn create_invoice(
    State(state): State<AppState>,
    Json(input): Json<CreateInvoice>,
) -> Result<(StatusCode, Json<Invoice>), AppError> {
    input.validate()?;

    let invoice = state.db.create_invoice(&input).await?;

    Ok((StatusCode::CREATED, Json(invoice)))
}

pub async fn update_invoice(
    State(state): State<AppState>,
    Path(invoice_id): Path<Uuid>,
    Json(input): Json<UpdateInvoice>,
) -> Result<Json<Invoice>, AppError> {
    input.validate()?;

    let invoice = state
        .db
        .update_invoice(invoice_id, &input)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Invoice not found")))?;

    Ok(Json(invoice))
}

pub async fn delete_invoice(
    State(state): State<AppState>,
    Path(invoice_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.db.delete_invoice(invoice_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(anyhow::anyhow!("Invoice not found")))
    }
}
