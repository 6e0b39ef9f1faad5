//! services/app/src/bin/summarizer.rs

use app_lib::{
    adapters::{FileStorage, MockSummarizer},
    config::Config,
    error::AppError,
    web::{router, state::ServerState},
};
use std::sync::Arc;
use summarizer_core::{RehydrationOutcome, Store};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Open Storage & Rehydrate ---
    info!("Opening storage in {}", config.storage_dir.display());
    let (storage, _writer) =
        FileStorage::open(&config.storage_dir).map_err(|source| AppError::StorageDir {
            path: config.storage_dir.clone(),
            source,
        })?;
    let store = Store::open(storage.clone());
    match store.rehydration() {
        RehydrationOutcome::Restored => info!("Restored stored state."),
        RehydrationOutcome::FirstRun => info!("No stored state found; starting from the seed."),
        RehydrationOutcome::Recovered { reason, .. } => {
            warn!("Stored state was unusable ({}); starting from the seed.", reason)
        }
        RehydrationOutcome::Unavailable { reason } => {
            warn!("Stored state could not be read ({}); starting from the seed.", reason)
        }
    }
    if store.is_persistence_suspended() {
        warn!("Persistence is suspended; changes will not be saved this session.");
    }

    // --- 3. Build the Shared ServerState ---
    let summarizer = Arc::new(MockSummarizer::new(config.summary_delay));
    let state = Arc::new(ServerState::new(store, summarizer, config.clone()));
    let app = router(state);

    // --- 4. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // --- 5. Drain Pending Writes ---
    info!("Server stopped. Flushing pending writes...");
    storage.flush().await?;
    info!("Shutdown complete.");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received.");
}
