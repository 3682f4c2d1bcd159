//! Common test utilities for dashboard-service integration tests.
#![allow(dead_code)]

use chrono::NaiveDate;
use dashboard_service::config::{DatabaseSettings, ServerSettings, Settings};
use dashboard_service::models::InvoiceStatus;
use dashboard_service::services::Database;
use dashboard_service::startup::Application;
use secrecy::Secret;
use std::sync::Once;
use uuid::Uuid;

static INIT: Once = Once::new();

/// Initialize tracing for tests (only once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info,dashboard_service=debug,sqlx=warn")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

fn database_url() -> String {
    std::env::var("TEST_DATABASE_URL")
        .expect("TEST_DATABASE_URL must be set to a PostgreSQL URL for integration tests")
}

/// Connect to the test database, run migrations and empty every table.
pub async fn test_database() -> Database {
    init_tracing();

    let db = Database::new(&database_url(), 2, 1)
        .await
        .expect("Failed to connect to test database");
    db.run_migrations()
        .await
        .expect("Failed to run migrations");
    purge(&db).await;

    db
}

/// Delete all rows, children before parents.
pub async fn purge(db: &Database) {
    for table in ["invoices", "customers", "revenue", "users"] {
        sqlx::query(&format!("DELETE FROM {}", table))
            .execute(db.pool())
            .await
            .unwrap_or_else(|e| panic!("Failed to purge {}: {}", table, e));
    }
}

pub async fn seed_customer(db: &Database, name: &str, email: &str) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO customers (id, name, email, image_url) VALUES ($1, $2, $3, $4)")
        .bind(id)
        .bind(name)
        .bind(email)
        .bind("/customers/avatar.png")
        .execute(db.pool())
        .await
        .expect("Failed to seed customer");
    id
}

pub async fn seed_invoice(
    db: &Database,
    customer_id: Uuid,
    amount: i32,
    status: InvoiceStatus,
    date: &str,
) -> Uuid {
    let id = Uuid::new_v4();
    let date: NaiveDate = date.parse().expect("Invalid date literal");
    sqlx::query(
        "INSERT INTO invoices (id, customer_id, amount, status, date) VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(id)
    .bind(customer_id)
    .bind(amount)
    .bind(status.as_str())
    .bind(date)
    .execute(db.pool())
    .await
    .expect("Failed to seed invoice");
    id
}

pub async fn seed_revenue(db: &Database, month: &str, revenue: i32) {
    sqlx::query("INSERT INTO revenue (month, revenue) VALUES ($1, $2)")
        .bind(month)
        .bind(revenue)
        .execute(db.pool())
        .await
        .expect("Failed to seed revenue");
}

pub async fn seed_user(db: &Database, name: &str, email: &str, password: &str) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO users (id, name, email, password) VALUES ($1, $2, $3, $4)")
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(password)
        .execute(db.pool())
        .await
        .expect("Failed to seed user");
    id
}

/// Spawn the HTTP application on a random port against an emptied database.
/// Returns the base URL and a database handle for seeding.
pub async fn spawn_app() -> (String, Database) {
    init_tracing();

    let settings = Settings {
        server: ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        database: DatabaseSettings {
            url: Secret::new(database_url()),
            max_connections: 2,
            min_connections: 1,
        },
        log_level: "debug".to_string(),
    };

    let app = Application::build(settings)
        .await
        .expect("Failed to build application");
    let address = format!("http://127.0.0.1:{}", app.port());

    tokio::spawn(async move {
        app.run_until_stopped().await.ok();
    });

    let db = Database::new(&database_url(), 2, 1)
        .await
        .expect("Failed to connect to test database");
    purge(&db).await;

    (address, db)
}
