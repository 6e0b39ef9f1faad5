//! services/app/src/error.rs
//!
//! Defines the error type returned by the summarizer binary.

use crate::config::ConfigError;
use std::path::PathBuf;
use summarizer_core::ports::PortError;

/// Everything that can stop the `summarizer` service from starting or shutting
/// down cleanly. Request-level failures never reach this type; handlers map them
/// to HTTP status codes.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The storage directory could not be created.
    #[error("Could not open storage directory {}: {source}", path.display())]
    StorageDir {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Pending writes could not be drained on shutdown.
    #[error("Failed to flush pending writes: {0}")]
    Flush(#[from] PortError),

    /// Binding the listener or serving connections failed.
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),
}
