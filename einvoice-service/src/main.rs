//! einvoice-service entry point.

use einvoice_service::config::EInvoiceConfig;
use einvoice_service::services::init_metrics;
use einvoice_service::startup::Application;
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Load configuration
    let config = EInvoiceConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    init_tracing("einvoice-service", &config.common.log_level);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        port = config.common.port,
        max_connections = config.database.max_connections,
        "Starting einvoice-service"
    );

    if config.auth.dev_secret {
        tracing::warn!("JWT_SECRET not set, using the development secret");
    }

    init_metrics();

    let application = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to build application: {}", e);
        std::io::Error::other(format!("Startup error: {}", e))
    })?;

    application.run_until_stopped().await?;

    tracing::info!("einvoice-service stopped");
    Ok(())
}
