use std::sync::Arc;

use anyhow::Context;

use agrimarket_api::app::{build_app, services::AppServices};
use agrimarket_infra::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    agrimarket_observability::init();

    let config = AppConfig::from_env()?;
    let services = Arc::new(
        AppServices::from_config(&config.store)
            .await
            .context("failed to open the document store")?,
    );

    let app = build_app(services.clone());

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    services.shutdown().await;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for ctrl-c");
    }
    tracing::info!("shutdown signal received");
}
