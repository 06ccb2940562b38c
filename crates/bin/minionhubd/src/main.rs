//! # minionhubd: minionhub daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars)
//! - Initialize the `SQLite` connection pool and run migrations
//! - Construct the repository, driver and discovery adapters
//! - Construct the minion service and start its background synchronization
//! - Build the axum router and serve it
//! - Stop both on SIGTERM/SIGINT
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer, no domain logic belongs here.

mod config;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use minionhub_adapter_http_axum::state::AppState;
use minionhub_adapter_storage_sqlite_sqlx::SqliteMinionRepository;
use minionhub_adapter_virtual::{VirtualDriver, VirtualNetwork};
use minionhub_app::services::minion_service::MinionService;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.logging.filter)?)
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "minionhubd starting");

    // Database
    let db = minionhub_adapter_storage_sqlite_sqlx::Config {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await?;
    let repo = SqliteMinionRepository::new(db.pool().clone());

    // Devices
    let driver = VirtualDriver::default();
    let network = VirtualNetwork::new(config.network.devices.clone());

    // Service
    let service = Arc::new(MinionService::new(
        repo,
        driver,
        network,
        config.sync_settings(),
    ));

    let shutdown = CancellationToken::new();
    let sync = {
        let service = Arc::clone(&service);
        let shutdown = shutdown.clone();
        tokio::spawn(async move { service.run(shutdown).await })
    };

    // HTTP
    let app = minionhub_adapter_http_axum::router::build(AppState::from_arc(service));

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(address = %bind_addr, "minionhubd listening");

    let signal_token = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(err) = wait_for_shutdown_signal().await {
                tracing::error!(%err, "failed to wait for shutdown signal");
            }
            signal_token.cancel();
        })
        .await?;

    shutdown.cancel();
    if let Err(err) = sync.await {
        tracing::error!(%err, "synchronization task failed");
    }
    db.close().await;

    tracing::info!("minionhubd stopped");
    Ok(())
}

async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;

        tokio::select! {
            _ = sigterm.recv() => tracing::info!("received SIGTERM"),
            _ = sigint.recv() => tracing::info!("received SIGINT"),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        tracing::info!("received Ctrl+C");
    }

    Ok(())
}
