//! dashboard-core: Shared infrastructure for the dashboard workspace.
pub mod error;
pub mod observability;
