use sales_service::config::SalesConfig;
use sales_service::services::init_metrics;
use sales_service::startup::Application;
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Configuration drives the tracing setup, so load it first with a
    // plain-stderr fallback for load failures.
    let config = SalesConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    init_tracing(
        "sales-service",
        &config.log_level,
        config.otlp_endpoint.as_deref(),
    );
    init_metrics();

    let app = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to build application: {}", e);
        std::io::Error::other(format!("Startup error: {}", e))
    })?;

    app.run_until_stopped().await
}
