pub mod adapters;
pub mod config;
pub mod error;
pub mod jobs;
pub mod web;

use std::sync::Arc;
use summarizer_core::Store;

/// The one store instance, shared by every handler, connection and job.
pub type SharedStore = Arc<tokio::sync::Mutex<Store>>;
