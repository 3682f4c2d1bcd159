//! Invoice models for dashboard-service.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Invoice status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InvoiceStatus {
    Pending,
    Paid,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "PENDING",
            InvoiceStatus::Paid => "PAID",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "PAID" => InvoiceStatus::Paid,
            _ => InvoiceStatus::Pending,
        }
    }
}

/// Invoice row as stored.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Invoice {
    pub id: Uuid,
    pub customer_id: Uuid,
    /// Amount in minor currency units (cents).
    pub amount: i32,
    pub status: String,
    pub date: NaiveDate,
}

/// Invoice joined to its customer for the search table. The amount stays in
/// minor units; formatting belongs to whoever renders the row.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct InvoiceRow {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub name: String,
    pub email: String,
    pub image_url: String,
    pub date: NaiveDate,
    pub amount: i32,
    pub status: String,
}

/// Raw row backing `LatestInvoice`, before currency formatting.
#[derive(Debug, Clone, FromRow)]
pub struct LatestInvoiceRow {
    pub id: Uuid,
    pub name: String,
    pub image_url: String,
    pub email: String,
    pub amount: i32,
}

/// One of the five most recent invoices, amount already display-formatted.
#[derive(Debug, Clone, Serialize)]
pub struct LatestInvoice {
    pub id: Uuid,
    pub name: String,
    pub image_url: String,
    pub email: String,
    pub amount: String,
}

/// Dashboard summary figures. The four values come from four independent
/// reads and may reflect slightly different points in time under concurrent
/// writes.
#[derive(Debug, Clone, Serialize)]
pub struct CardData {
    pub number_of_invoices: i64,
    pub number_of_customers: i64,
    pub total_paid_invoices: String,
    pub total_pending_invoices: String,
}

/// Input for creating an invoice. The amount arrives in major units as
/// submitted by the invoice form and is converted to cents on write.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateInvoice {
    pub customer_id: Uuid,
    #[validate(range(min = 0.0))]
    pub amount: f64,
    pub status: InvoiceStatus,
}

/// Input for updating an invoice. Same shape as the create form.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateInvoice {
    pub customer_id: Uuid,
    #[validate(range(min = 0.0))]
    pub amount: f64,
    pub status: InvoiceStatus,
}
