// Main entry point - Feed wiring and read API server setup
use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use sensor_dashboard::application::polling_scheduler::PollingScheduler;
use sensor_dashboard::infrastructure::config::load_dashboard_config;
use sensor_dashboard::infrastructure::sensor_api::HttpSensorSource;
use sensor_dashboard::presentation::app_state::AppState;
use sensor_dashboard::presentation::router;
use sensor_dashboard::presentation::snapshot_board::SnapshotBoard;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = load_dashboard_config().context("Failed to load dashboard configuration")?;
    let feeds = config.build_feeds().context("Invalid feed configuration")?;

    // Data source (infrastructure) and renderer (presentation)
    let source = Arc::new(HttpSensorSource::new(config.sensor_api.base_url.clone()));
    let board = Arc::new(SnapshotBoard::with_feeds(
        feeds.iter().map(|feed| feed.name.clone()),
    ));

    // Each feed polls on its own task and owns its series store
    let mut scheduler = PollingScheduler::new(source, board.clone());
    for feed in feeds {
        scheduler.register_feed(feed);
    }

    let state = Arc::new(AppState { board });

    let router = router(state);

    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.server.bind))?;
    tracing::info!(
        "Starting sensor-dashboard on {} with {} feeds",
        addr,
        scheduler.feed_count()
    );

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutting down feeds");
    scheduler.shutdown().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
