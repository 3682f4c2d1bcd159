//! Customer models for dashboard-service.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Customer row as stored.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub image_url: String,
}

/// Minimal customer projection for the invoice-form dropdown.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CustomerField {
    pub id: Uuid,
    pub name: String,
}

/// Customer with per-customer invoice aggregates, sums still in minor units.
#[derive(Debug, Clone, FromRow)]
pub struct CustomerTableRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub image_url: String,
    pub total_invoices: i64,
    pub total_pending: i64,
    pub total_paid: i64,
}

/// Customer table entry with the pending/paid sums display-formatted.
#[derive(Debug, Clone, Serialize)]
pub struct FormattedCustomerRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub image_url: String,
    pub total_invoices: i64,
    pub total_pending: String,
    pub total_paid: String,
}
