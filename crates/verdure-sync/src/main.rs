//! Verdure sync service - background acquisition and snapshot publishing.
//!
//! Run with: `cargo run -p verdure-sync`

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::broadcast;
use tracing::info;

use verdure_store::Store;
use verdure_sync::{AppState, Collector, Config, StoreSource};

/// Verdure sync service - keeps the sensor snapshot in sync with storage.
#[derive(Parser, Debug)]
#[command(name = "verdure-sync")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Database path (overrides config).
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Poll interval in seconds (overrides config).
    #[arg(short, long)]
    interval: Option<u64>,

    /// Disable the background acquisition loop (query-only mode).
    #[arg(long)]
    no_collector: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("verdure_sync=info".parse()?),
        )
        .init();

    // Load configuration
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default().unwrap_or_default(),
    };

    // Override config with CLI args
    if let Some(db_path) = args.database {
        config.storage.path = db_path;
    }
    if let Some(interval) = args.interval {
        config.acquisition.poll_interval = interval;
    }
    config.validate()?;

    // Open the database
    info!("Opening database at {:?}", config.storage.path);
    let store = Store::open(&config.storage.path)?;

    // Create application state and prime it from storage
    let state = AppState::new(store, config);
    state.prime().await?;
    info!(
        "{} day(s) with recorded data",
        state.availability.len()
    );

    // Log every published snapshot; stands in for the presentation layer.
    let mut updates = state.snapshot.subscribe();
    tokio::spawn(async move {
        loop {
            match updates.recv().await {
                Ok(snapshot) => {
                    for (metric, value) in snapshot.reading.metrics() {
                        info!("{}: {}", metric, value);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    // Start the acquisition loop
    let collector_handle = if !args.no_collector {
        let source = Arc::new(StoreSource::new(Arc::clone(&state.store)));
        Some(Collector::new(Arc::clone(&state), source).spawn())
    } else {
        info!("Acquisition loop disabled");
        None
    };

    // Run until interrupted
    tokio::signal::ctrl_c().await?;
    info!("Shutting down");

    state.collector.signal_stop();
    if let Some(handle) = collector_handle {
        let _ = handle.await;
    }

    Ok(())
}
