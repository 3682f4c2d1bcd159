use dashboard_core::observability::logging::init_tracing;
use dashboard_service::config::get_configuration;
use dashboard_service::startup::Application;
use dotenvy::dotenv;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let configuration = get_configuration().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing(&configuration.log_level);

    dashboard_service::services::metrics::init_metrics();

    let address = format!(
        "{}:{}",
        configuration.server.host, configuration.server.port
    );

    let app = Application::build(configuration)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to build application: {}", e))?;

    info!("Starting dashboard-service on {}", address);
    app.run_until_stopped().await.map_err(|e| {
        tracing::error!("Server error: {}", e);
        anyhow::anyhow!("Server error: {}", e)
    })?;

    Ok(())
}
