//! Database service for dashboard-service.

use crate::models::{
    CardData, CreateInvoice, CustomerField, CustomerTableRow, FormattedCustomerRow, Invoice,
    InvoiceRow, InvoiceStatus, LatestInvoice, LatestInvoiceRow, Revenue, UpdateInvoice, User,
};
use crate::services::metrics::DB_QUERY_DURATION;
use crate::utils::format_currency;
use dashboard_core::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{error, info, instrument};
use uuid::Uuid;

/// Rows per page of the invoice search table. Part of the public pagination
/// contract: callers learn the valid page range from `fetch_invoices_pages`.
pub const ITEMS_PER_PAGE: u32 = 6;

/// Search predicate shared by `fetch_filtered_invoices` and
/// `fetch_invoices_pages`. The page count and the page contents must be
/// computed from the same filter, so both queries are built from this one
/// fragment. `$1` is the `%query%` pattern.
const INVOICE_MATCH_CLAUSE: &str = "customers.name ILIKE $1
           OR customers.email ILIKE $1
           OR invoices.amount::text ILIKE $1
           OR invoices.date::text ILIKE $1
           OR invoices.status::text ILIKE $1";

fn like_pattern(query: &str) -> String {
    format!("%{}%", query)
}

fn page_count(matching_rows: i64) -> u64 {
    (matching_rows.max(0) as u64).div_ceil(u64::from(ITEMS_PER_PAGE))
}

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "dashboard-service"))]
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, AppError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check database health.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;
        Ok(())
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Invoice search and pagination
    // -------------------------------------------------------------------------

    /// Fetch one page of invoices matching a free-text query, joined to their
    /// customers, newest first. Amounts stay in minor units.
    ///
    /// Pages are 1-based; callers are expected to clamp `page` to >= 1 before
    /// calling.
    #[instrument(skip(self))]
    pub async fn fetch_filtered_invoices(
        &self,
        query: &str,
        page: u32,
    ) -> Result<Vec<InvoiceRow>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["fetch_filtered_invoices"])
            .start_timer();

        let offset = (i64::from(page) - 1) * i64::from(ITEMS_PER_PAGE);
        let sql = format!(
            r#"
            SELECT
                invoices.id,
                invoices.customer_id,
                customers.name,
                customers.email,
                customers.image_url,
                invoices.date,
                invoices.amount,
                invoices.status
            FROM invoices
            JOIN customers ON invoices.customer_id = customers.id
            WHERE {INVOICE_MATCH_CLAUSE}
            ORDER BY invoices.date DESC
            LIMIT $2 OFFSET $3
            "#
        );

        let invoices = sqlx::query_as::<_, InvoiceRow>(&sql)
            .bind(like_pattern(query))
            .bind(i64::from(ITEMS_PER_PAGE))
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!(error = %e, "Database error while searching invoices");
                AppError::DatabaseError(anyhow::anyhow!("Failed to fetch invoices"))
            })?;

        timer.observe_duration();

        Ok(invoices)
    }

    /// Total number of pages for a free-text query, using the same predicate
    /// as `fetch_filtered_invoices`. Zero matching rows means zero pages.
    #[instrument(skip(self))]
    pub async fn fetch_invoices_pages(&self, query: &str) -> Result<u64, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["fetch_invoices_pages"])
            .start_timer();

        let sql = format!(
            r#"
            SELECT COUNT(*)
            FROM invoices
            JOIN customers ON invoices.customer_id = customers.id
            WHERE {INVOICE_MATCH_CLAUSE}
            "#
        );

        let total: i64 = sqlx::query_scalar(&sql)
            .bind(like_pattern(query))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!(error = %e, "Database error while counting invoices");
                AppError::DatabaseError(anyhow::anyhow!("Failed to fetch total number of invoices"))
            })?;

        timer.observe_duration();

        Ok(page_count(total))
    }

    // -------------------------------------------------------------------------
    // Dashboard aggregation
    // -------------------------------------------------------------------------

    /// Dashboard summary cards: invoice/customer counts plus paid and pending
    /// totals. Four independent reads, no transaction.
    #[instrument(skip(self))]
    pub async fn fetch_card_data(&self) -> Result<CardData, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["fetch_card_data"])
            .start_timer();

        let number_of_invoices = self
            .count_rows("SELECT COUNT(*) FROM invoices")
            .await?;
        let number_of_customers = self
            .count_rows("SELECT COUNT(*) FROM customers")
            .await?;
        let paid_total = self.sum_invoices_with_status(InvoiceStatus::Paid).await?;
        let pending_total = self
            .sum_invoices_with_status(InvoiceStatus::Pending)
            .await?;

        timer.observe_duration();

        Ok(CardData {
            number_of_invoices,
            number_of_customers,
            total_paid_invoices: format_currency(paid_total),
            total_pending_invoices: format_currency(pending_total),
        })
    }

    async fn count_rows(&self, sql: &str) -> Result<i64, AppError> {
        sqlx::query_scalar(sql)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!(error = %e, "Database error while aggregating card data");
                AppError::DatabaseError(anyhow::anyhow!("Failed to fetch card data"))
            })
    }

    async fn sum_invoices_with_status(&self, status: InvoiceStatus) -> Result<i64, AppError> {
        sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(amount), 0)
            FROM invoices
            WHERE status = $1
            "#,
        )
        .bind(status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, status = status.as_str(), "Database error while aggregating card data");
            AppError::DatabaseError(anyhow::anyhow!("Failed to fetch card data"))
        })
    }

    /// The five most recent invoices with customer details, amounts already
    /// display-formatted.
    #[instrument(skip(self))]
    pub async fn fetch_latest_invoices(&self) -> Result<Vec<LatestInvoice>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["fetch_latest_invoices"])
            .start_timer();

        let rows = sqlx::query_as::<_, LatestInvoiceRow>(
            r#"
            SELECT invoices.id, customers.name, customers.image_url, customers.email, invoices.amount
            FROM invoices
            JOIN customers ON invoices.customer_id = customers.id
            ORDER BY invoices.date DESC
            LIMIT 5
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error while fetching latest invoices");
            AppError::DatabaseError(anyhow::anyhow!("Failed to fetch the latest invoices"))
        })?;

        timer.observe_duration();

        Ok(rows
            .into_iter()
            .map(|row| LatestInvoice {
                id: row.id,
                name: row.name,
                image_url: row.image_url,
                email: row.email,
                amount: format_currency(i64::from(row.amount)),
            })
            .collect())
    }

    /// Full monthly revenue rollup.
    #[instrument(skip(self))]
    pub async fn fetch_revenue(&self) -> Result<Vec<Revenue>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["fetch_revenue"])
            .start_timer();

        let revenue = sqlx::query_as::<_, Revenue>("SELECT month, revenue FROM revenue")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!(error = %e, "Database error while fetching revenue");
                AppError::DatabaseError(anyhow::anyhow!("Failed to fetch revenue data"))
            })?;

        timer.observe_duration();

        Ok(revenue)
    }

    // -------------------------------------------------------------------------
    // Customer reads
    // -------------------------------------------------------------------------

    /// All customers, id and name only, for the invoice-form dropdown.
    #[instrument(skip(self))]
    pub async fn fetch_customers(&self) -> Result<Vec<CustomerField>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["fetch_customers"])
            .start_timer();

        let customers =
            sqlx::query_as::<_, CustomerField>("SELECT id, name FROM customers ORDER BY name ASC")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    error!(error = %e, "Database error while fetching customers");
                    AppError::DatabaseError(anyhow::anyhow!("Failed to fetch all customers"))
                })?;

        timer.observe_duration();

        Ok(customers)
    }

    /// Customer table: name/email filter plus per-customer invoice counts and
    /// pending/paid totals, formatted for display.
    #[instrument(skip(self))]
    pub async fn fetch_filtered_customers(
        &self,
        query: &str,
    ) -> Result<Vec<FormattedCustomerRow>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["fetch_filtered_customers"])
            .start_timer();

        let rows = sqlx::query_as::<_, CustomerTableRow>(
            r#"
            SELECT
                customers.id,
                customers.name,
                customers.email,
                customers.image_url,
                COUNT(invoices.id) AS total_invoices,
                COALESCE(SUM(CASE WHEN invoices.status = 'PENDING' THEN invoices.amount ELSE 0 END), 0) AS total_pending,
                COALESCE(SUM(CASE WHEN invoices.status = 'PAID' THEN invoices.amount ELSE 0 END), 0) AS total_paid
            FROM customers
            LEFT JOIN invoices ON customers.id = invoices.customer_id
            WHERE
                customers.name ILIKE $1 OR
                customers.email ILIKE $1
            GROUP BY customers.id, customers.name, customers.email, customers.image_url
            ORDER BY customers.name ASC
            "#,
        )
        .bind(like_pattern(query))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error while fetching customer table");
            AppError::DatabaseError(anyhow::anyhow!("Failed to fetch customer table"))
        })?;

        timer.observe_duration();

        Ok(rows
            .into_iter()
            .map(|row| FormattedCustomerRow {
                id: row.id,
                name: row.name,
                email: row.email,
                image_url: row.image_url,
                total_invoices: row.total_invoices,
                total_pending: format_currency(row.total_pending),
                total_paid: format_currency(row.total_paid),
            })
            .collect())
    }

    // -------------------------------------------------------------------------
    // Single-row lookups
    // -------------------------------------------------------------------------

    /// Get an invoice by ID.
    #[instrument(skip(self), fields(invoice_id = %invoice_id))]
    pub async fn fetch_invoice_by_id(
        &self,
        invoice_id: Uuid,
    ) -> Result<Option<Invoice>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["fetch_invoice_by_id"])
            .start_timer();

        let invoice = sqlx::query_as::<_, Invoice>(
            "SELECT id, customer_id, amount, status, date FROM invoices WHERE id = $1",
        )
        .bind(invoice_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error while fetching invoice");
            AppError::DatabaseError(anyhow::anyhow!("Failed to fetch invoice"))
        })?;

        timer.observe_duration();

        Ok(invoice)
    }

    /// Look up a user by email for the auth layer.
    #[instrument(skip(self))]
    pub async fn get_user(&self, email: &str) -> Result<Option<User>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_user"])
            .start_timer();

        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error while fetching user");
            AppError::DatabaseError(anyhow::anyhow!("Failed to fetch user"))
        })?;

        timer.observe_duration();

        Ok(user)
    }

    // -------------------------------------------------------------------------
    // Invoice mutations
    // -------------------------------------------------------------------------

    /// Create an invoice dated today. The form amount is in major units and
    /// is converted to cents here, before any arithmetic happens on it.
    #[instrument(skip(self, input), fields(customer_id = %input.customer_id))]
    pub async fn create_invoice(&self, input: &CreateInvoice) -> Result<Invoice, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_invoice"])
            .start_timer();

        let amount_in_cents = (input.amount * 100.0).round() as i32;
        let invoice = sqlx::query_as::<_, Invoice>(
            r#"
            INSERT INTO invoices (id, customer_id, amount, status, date)
            VALUES ($1, $2, $3, $4, CURRENT_DATE)
            RETURNING id, customer_id, amount, status, date
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.customer_id)
        .bind(amount_in_cents)
        .bind(input.status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                AppError::BadRequest(anyhow::anyhow!(
                    "Customer {} does not exist",
                    input.customer_id
                ))
            }
            _ => {
                error!(error = %e, "Database error while creating invoice");
                AppError::DatabaseError(anyhow::anyhow!("Unable to create invoice"))
            }
        })?;

        timer.observe_duration();

        info!(invoice_id = %invoice.id, "Invoice created");

        Ok(invoice)
    }

    /// Update an invoice's customer, amount and status.
    #[instrument(skip(self, input), fields(invoice_id = %invoice_id))]
    pub async fn update_invoice(
        &self,
        invoice_id: Uuid,
        input: &UpdateInvoice,
    ) -> Result<Option<Invoice>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_invoice"])
            .start_timer();

        let amount_in_cents = (input.amount * 100.0).round() as i32;
        let invoice = sqlx::query_as::<_, Invoice>(
            r#"
            UPDATE invoices
            SET customer_id = $2,
                amount = $3,
                status = $4
            WHERE id = $1
            RETURNING id, customer_id, amount, status, date
            "#,
        )
        .bind(invoice_id)
        .bind(input.customer_id)
        .bind(amount_in_cents)
        .bind(input.status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                AppError::BadRequest(anyhow::anyhow!(
                    "Customer {} does not exist",
                    input.customer_id
                ))
            }
            _ => {
                error!(error = %e, "Database error while updating invoice");
                AppError::DatabaseError(anyhow::anyhow!("Unable to update invoice"))
            }
        })?;

        timer.observe_duration();

        if let Some(ref inv) = invoice {
            info!(invoice_id = %inv.id, "Invoice updated");
        }

        Ok(invoice)
    }

    /// Delete an invoice. Removes exactly one row when the id exists.
    #[instrument(skip(self), fields(invoice_id = %invoice_id))]
    pub async fn delete_invoice(&self, invoice_id: Uuid) -> Result<bool, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["delete_invoice"])
            .start_timer();

        let result = sqlx::query("DELETE FROM invoices WHERE id = $1")
            .bind(invoice_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!(error = %e, "Database error while deleting invoice");
                AppError::DatabaseError(anyhow::anyhow!("Failed to delete invoice"))
            })?;

        timer.observe_duration();

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!(invoice_id = %invoice_id, "Invoice deleted");
        }

        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_count_rounds_up_and_maps_zero_to_zero() {
        assert_eq!(page_count(0), 0);
        assert_eq!(page_count(1), 1);
        assert_eq!(page_count(6), 1);
        assert_eq!(page_count(7), 2);
        assert_eq!(page_count(12), 2);
        assert_eq!(page_count(13), 3);
    }

    #[test]
    fn like_pattern_wraps_query_in_wildcards() {
        assert_eq!(like_pattern(""), "%%");
        assert_eq!(like_pattern("paid"), "%paid%");
    }

    #[test]
    fn match_clause_covers_every_searchable_column() {
        for column in [
            "customers.name",
            "customers.email",
            "invoices.amount::text",
            "invoices.date::text",
            "invoices.status::text",
        ] {
            assert!(INVOICE_MATCH_CLAUSE.contains(column), "missing {}", column);
        }
    }
}
