// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use anyhow::Context;
use std::{net::SocketAddr, sync::Arc};
use tracing_subscriber::EnvFilter;

use crate::application::clock::SystemClock;
use crate::application::next_races_service::NextRacesService;
use crate::application::races_coordinator::RacesCoordinator;
use crate::application::ticker::DefaultRacesTicker;
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::neds_data_source::NedsDataSource;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::build_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = load_app_config()?;

    // Create data source (infrastructure layer)
    let data_source = Arc::new(NedsDataSource::new(
        config.api.base_url.clone(),
        config.api.timeout(),
    )?);

    // Create services (application layer)
    let clock = Arc::new(SystemClock);
    let repository = Arc::new(NextRacesService::new(data_source, clock.clone()));
    let ticker = Arc::new(DefaultRacesTicker::new(
        config.ticker.refresh_interval(),
        config.ticker.countdown_interval(),
    ));
    let races = RacesCoordinator::new(repository, clock, ticker).start();

    // Create application state
    let state = Arc::new(AppState {
        races: races.client(),
    });

    // Build router (presentation layer)
    let router = build_router(state);

    // Start server
    let addr: SocketAddr = config
        .server
        .bind_addr
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.server.bind_addr))?;
    tracing::info!("Starting next-races service on {}", addr);

    // Stopping the coordinator first ends open event streams so shutdown can complete
    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            races.shutdown().await;
        })
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
}
