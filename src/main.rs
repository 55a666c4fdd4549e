// Main entry point
use anyhow::Context;
use std::sync::Arc;
use tokio::net::TcpListener;

use weathergate::domain::traits::{KeyValueStore, WeatherProvider};
use weathergate::infrastructure::config::Config;
use weathergate::infrastructure::network::client::VisualCrossingClient;
use weathergate::infrastructure::network::http::create_client;
use weathergate::infrastructure::storage::redis::RedisStore;
use weathergate::interfaces::http::router;
use weathergate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_logging();

    let config = Config::from_env().context("failed to load configuration")?;
    let addr = config.listen_addr()?;

    let http_client = create_client(config.upstream_timeout_secs)?;
    let upstream: Arc<dyn WeatherProvider> = Arc::new(VisualCrossingClient::new(
        http_client,
        config.upstream_base_url.clone(),
        config.upstream_api_key.clone(),
    ));
    let store: Arc<dyn KeyValueStore> = Arc::new(
        RedisStore::connect(&config.redis_url)
            .await
            .context("failed to connect to the key-value store")?,
    );

    let state = Arc::new(AppState::new(
        store,
        upstream,
        config.rate_limit_max,
        config.rate_limit_window_secs,
    ));

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!(%addr, "weathergate listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

/// Initialize logging with `RUST_LOG` override, defaulting to info.
fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(%err, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("shutdown signal received, draining connections");
}
