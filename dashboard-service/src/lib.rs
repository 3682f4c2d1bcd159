//! Dashboard Service - invoice search, pagination, and aggregation over PostgreSQL.

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod startup;
pub mod utils;
