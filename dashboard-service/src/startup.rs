use axum::{middleware::from_fn, routing::get, Router};
use dashboard_core::error::AppError;
use secrecy::ExposeSecret;
use tower_http::trace::TraceLayer;

use crate::config::Settings;
use crate::handlers::{
    app::health_check,
    customers::{customers_table, list_customers},
    dashboard::{cards, latest_invoices, revenue},
    invoices::{create_invoice, delete_invoice, get_invoice, list_invoices, update_invoice},
};
use crate::middleware::metrics::metrics_middleware;
use crate::services::Database;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(crate::handlers::metrics::metrics))
        .route("/dashboard/cards", get(cards))
        .route("/dashboard/latest-invoices", get(latest_invoices))
        .route("/dashboard/revenue", get(revenue))
        .route("/invoices", get(list_invoices).post(create_invoice))
        .route(
            "/invoices/:id",
            get(get_invoice).put(update_invoice).delete(delete_invoice),
        )
        .route("/customers", get(list_customers))
        .route("/customers/table", get(customers_table))
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .with_state(state)
}

/// A built application: migrated database, bound listener, routed server.
pub struct Application {
    port: u16,
    listener: tokio::net::TcpListener,
    router: Router,
}

impl Application {
    pub async fn build(settings: Settings) -> Result<Self, AppError> {
        let db = Database::new(
            settings.database.url.expose_secret(),
            settings.database.max_connections,
            settings.database.min_connections,
        )
        .await?;
        db.run_migrations().await?;

        let address = format!("{}:{}", settings.server.host, settings.server.port);
        let listener = tokio::net::TcpListener::bind(&address).await?;
        let port = listener.local_addr()?.port();

        let router = build_router(AppState { db });

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    /// The port the server is bound to. Useful with port 0 in tests.
    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        axum::serve(self.listener, self.router).await
    }
}
