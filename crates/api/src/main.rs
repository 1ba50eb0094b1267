use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use assettrack_api::ApiConfig;
use assettrack_api::app::{self, services::AppServices};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ApiConfig::load().await?;
    assettrack_observability::init(config.log_format);

    let services = AppServices::from_config(&config).await?;
    let backend = services.backend();
    let router = app::build_app(Arc::new(services));

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(addr = %listener.local_addr()?, backend, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
