//! Harbor Screen: mental-health risk screening service
//!
//! Main entry point for the HTTP server.

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use harbor_screen::adapters::sanitize::SanitizingMakeWriter;
use harbor_screen::adapters::load_model_dir;
use harbor_screen::api::{create_router, AppState};
use harbor_screen::application::{ModelContext, ScreeningService};
use harbor_screen::config::{LogMode, ServiceConfig};

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServiceConfig::from_env()?;

    let (writer, _guard) = match config.log_mode {
        LogMode::File => {
            if let Some(parent) = config.log_file.parent() {
                // Best-effort: a missing directory surfaces as the open error below.
                let _ = std::fs::create_dir_all(parent);
            }

            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&config.log_file)
                .with_context(|| format!("opening log file {}", config.log_file.display()))?;
            tracing_appender::non_blocking(file)
        }
        LogMode::Stdout => tracing_appender::non_blocking(std::io::stdout()),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(SanitizingMakeWriter::new(writer)))
        .init();

    tracing::info!("Starting Harbor Screen...");

    // No model, no service.
    let loaded = load_model_dir(&config.model_dir, &config.load_options()).map_err(|e| {
        tracing::error!("Error loading model: {}", e);
        e
    })?;
    tracing::info!(
        "Loaded {} with {} features (sha256={})",
        loaded.classifier.model_type(),
        loaded.schema.len(),
        loaded.artifact_sha256
    );

    let context = ModelContext::from_loaded(loaded, config.unknown_category_policy)?;
    tracing::info!("Unknown category policy: {}", context.policy());
    let service = ScreeningService::new(context);

    let app = create_router(AppState::new(service, config.cors_origins.clone()));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    tracing::info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Harbor Screen shutdown complete.");
    Ok(())
}
