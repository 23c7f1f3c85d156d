//! Eventdeck HTTP server.
//!
//! Reads configuration from the environment (and `.env` if present),
//! connects to `PostgreSQL` and Redis, applies migrations, exposes
//! Prometheus metrics on a separate port and serves the API until Ctrl+C
//! or SIGTERM.

use anyhow::Context;
use eventdeck_core::config::EngineConfig;
use eventdeck_core::environment::SystemClock;
use eventdeck_core::metrics::register_business_metrics;
use eventdeck_core::service::EventEngine;
use eventdeck_postgres::PostgresStore;
use eventdeck_web::{AppState, Config, RedisRateLimiter, router};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,eventdeck=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Eventdeck server");

    let config = Config::from_env();
    info!(
        server = %config.server_address(),
        metrics = %config.metrics_address(),
        "Configuration loaded"
    );

    let metrics_addr: SocketAddr = config
        .metrics_address()
        .parse()
        .context("Invalid metrics address")?;
    PrometheusBuilder::new()
        .with_http_listener(metrics_addr)
        .set_buckets_for_metric(
            Matcher::Suffix("duration_seconds".to_string()),
            &[0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5],
        )
        .context("Invalid histogram buckets")?
        .install()
        .context("Failed to install Prometheus exporter")?;
    register_business_metrics();

    let store = PostgresStore::connect(&config.database.url, &config.database.pool_settings())
        .await
        .context("Failed to connect to PostgreSQL")?;
    store.migrate().await.context("Failed to run migrations")?;
    info!("Database ready");

    let rate_limiter = RedisRateLimiter::new(&config.redis.url)
        .await
        .context("Failed to connect to Redis")?;
    info!("Rate limiter ready");

    let engine = EventEngine::new(
        Arc::new(store),
        Arc::new(SystemClock),
        EngineConfig::from(&config.engine),
    );
    let state = AppState::new(engine, Arc::new(rate_limiter), config.rate_limit);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(config.server_address())
        .await
        .with_context(|| format!("Failed to bind {}", config.server_address()))?;
    info!(address = %config.server_address(), "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
