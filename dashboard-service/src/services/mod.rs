//! Services module for dashboard-service.

pub mod database;
pub mod metrics;

pub use database::{Database, ITEMS_PER_PAGE};
pub use metrics::{get_metrics, init_metrics};
