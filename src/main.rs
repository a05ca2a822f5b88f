use anyhow::Context;
use tracing_subscriber::EnvFilter;

use portal_api::{app, config::config, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up JWT_SECRET, PORTAL_DATA_DIR, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("portal_api=info,tower_http=info")),
        )
        .init();

    let config = config().clone();
    tracing::info!("Starting Portal API in {:?} mode", config.environment);
    if config.uses_dev_secret() {
        tracing::warn!("JWT_SECRET is not set; using the development signing secret");
    }

    let bind_addr = config.bind_addr();
    let state = AppState::initialize(config).await?;

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Portal API listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await.context("server error")?;
    Ok(())
}
