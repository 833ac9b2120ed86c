//! Storefront Catalog - variant preview and cart service

use anyhow::{Context, Result};
use std::sync::Arc;
use storefront_catalog::{api, config::Config, store::MemoryStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();
    let config = Config::from_env()?;
    let port = config.port;
    let app = api::router(api::AppState::new(config, Arc::new(MemoryStore::new())));

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await.with_context(|| format!("Failed to bind port {port}"))?;
    tracing::info!("Storefront catalog listening on 0.0.0.0:{}", port);
    axum::serve(listener, app).await?;
    Ok(())
}
