// Main entry point for the webtoon generation server

use anyhow::{Context, Result};
use server_core::kernel::JobSpawner;
use server_core::server::{build_app, build_deps};
use server_core::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,server_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Diary Webtoon Generation Service");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(
        region = %config.aws_region,
        bucket = %config.bucket_name,
        "Configuration loaded"
    );

    // Build dependencies and application
    let deps = build_deps(&config)
        .await
        .context("Failed to build server dependencies")?;
    let app = build_app(deps, JobSpawner::new(), config.upload_dir.clone());

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
