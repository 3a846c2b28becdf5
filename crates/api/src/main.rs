use std::sync::Arc;

use anyhow::Context;

use silversport_api::{app, config::AppConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    silversport_observability::init();

    let config = AppConfig::from_env()?;
    let services = app::services::build_services(&config).await?;
    let app = app::build_app(Arc::new(services));

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(addr = %listener.local_addr()?, "Silver Sport is running");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
