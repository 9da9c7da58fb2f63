use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tripsafe::config::Config;
use tripsafe::server::{AppState, router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // 1. Configuration
    let config = Config::from_env().context("failed to read configuration")?;

    // 2. Risk grid
    let grid = config.build_grid().context("failed to build the risk grid")?;
    info!(cells = grid.len(), hotspots = config.hotspots.len(), "risk grid ready");

    let shared_state = Arc::new(AppState { grid });

    // 3. Serve
    let app = router(shared_state);

    info!("API server running on http://{}", config.bind);
    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    axum::serve(listener, app).await?;

    Ok(())
}
