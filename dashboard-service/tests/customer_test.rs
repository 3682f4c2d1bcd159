//! Customer read integration tests.

mod common;

use common::{seed_customer, seed_invoice, seed_user, test_database};
use dashboard_service::models::InvoiceStatus;
use serial_test::serial;

#[tokio::test]
#[serial]
#[ignore] // Requires PostgreSQL
async fn customers_are_listed_by_name_ascending() {
    let db = test_database().await;
    seed_customer(&db, "Charlie Davis", "charlie@davis.com").await;
    seed_customer(&db, "Alice Zhang", "alice@zhang.dev").await;
    seed_customer(&db, "Bob Otto", "bob@otto.dev").await;

    let customers = db.fetch_customers().await.unwrap();
    let names: Vec<_> = customers.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Alice Zhang", "Bob Otto", "Charlie Davis"]);
}

#[tokio::test]
#[serial]
#[ignore] // Requires PostgreSQL
async fn customer_table_aggregates_counts_and_sums_per_customer() {
    let db = test_database().await;
    let alice = seed_customer(&db, "Alice Zhang", "alice@zhang.dev").await;
    seed_customer(&db, "Bob Otto", "bob@otto.dev").await;

    seed_invoice(&db, alice, 500, InvoiceStatus::Pending, "2024-01-01").await;
    seed_invoice(&db, alice, 1500, InvoiceStatus::Paid, "2024-01-02").await;

    let rows = db.fetch_filtered_customers("").await.unwrap();
    assert_eq!(rows.len(), 2);

    let alice_row = rows.iter().find(|r| r.name == "Alice Zhang").unwrap();
    assert_eq!(alice_row.total_invoices, 2);
    assert_eq!(alice_row.total_pending, "$5.00");
    assert_eq!(alice_row.total_paid, "$15.00");

    // Left join: customers without invoices still appear, all zeroes.
    let bob_row = rows.iter().find(|r| r.name == "Bob Otto").unwrap();
    assert_eq!(bob_row.total_invoices, 0);
    assert_eq!(bob_row.total_pending, "$0.00");
    assert_eq!(bob_row.total_paid, "$0.00");
}

#[tokio::test]
#[serial]
#[ignore] // Requires PostgreSQL
async fn customer_table_filters_by_name_or_email() {
    let db = test_database().await;
    seed_customer(&db, "Alice Zhang", "alice@zhang.dev").await;
    seed_customer(&db, "Bob Otto", "bob@otto.dev").await;

    let rows = db.fetch_filtered_customers("otto.dev").await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "Bob Otto");

    let rows = db.fetch_filtered_customers("ALICE").await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].email, "alice@zhang.dev");
}

#[tokio::test]
#[serial]
#[ignore] // Requires PostgreSQL
async fn get_user_looks_up_credentials_by_email() {
    let db = test_database().await;
    seed_user(&db, "Admin", "admin@example.com", "$2b$10$hash").await;

    let user = db.get_user("admin@example.com").await.unwrap();
    let user = user.expect("user should exist");
    assert_eq!(user.name, "Admin");
    assert_eq!(user.password, "$2b$10$hash");

    assert!(db.get_user("nobody@example.com").await.unwrap().is_none());
}
