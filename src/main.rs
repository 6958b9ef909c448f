use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use config::{Config, StoreKind};
use dal::PgStore;
use dotenvy::dotenv;
use store::{SharedStore, memory::MemoryStore};
use tokio::net::TcpListener;
use tokio::select;
use tokio::signal;
use tracing::{error, info, warn};

mod api;
mod config;
mod dal;
mod model;
mod store;
mod telemetry;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    _ = dotenv();
    let config = Config::parse();

    let telemetry = telemetry::init(&config)?;

    let result = run(config).await;
    if let Err(e) = &result {
        error!("{e:?}");
    }

    telemetry.shutdown();
    result
}

async fn run(config: Config) -> Result<()> {
    let store = open_store(&config).await?;
    let router = api::router(store);

    let listener = TcpListener::bind(config.listen_addr())
        .await
        .with_context(|| format!("couldn't bind {}", config.listen_addr()))?;
    info!("Server running on http://{}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn open_store(config: &Config) -> Result<SharedStore> {
    match config.store {
        StoreKind::Memory => {
            warn!("Using the in-memory store, nothing will be persisted");
            Ok(Arc::new(MemoryStore::default()))
        }
        StoreKind::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set when using the postgres store")?;

            Ok(Arc::new(PgStore::connect(database_url).await?))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Error listening for ctrl-c: {e}");
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
                error!("Error listening for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    select! {
        _ = ctrl_c => info!("Received ctrl-c, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
