//! crates/summarizer_core/src/ports.rs
//!
//! Defines the service contracts (traits) the core depends on.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to stay independent of concrete storage or summarization backends.

use async_trait::async_trait;

use crate::domain::{SummaryDraft, SummaryRequest};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Durable key-value storage for serialized state.
///
/// Both methods are synchronous: store mutations never suspend, so an
/// implementation that talks to slow media must hand writes off internally and
/// return immediately.
pub trait StateStorage: Send + Sync {
    /// Returns the raw value stored under `key`, or `None` if nothing is stored.
    fn read(&self, key: &str) -> PortResult<Option<String>>;

    /// Replaces the value stored under `key`.
    fn write(&self, key: &str, value: &str) -> PortResult<()>;
}

#[async_trait]
pub trait SummarizationService: Send + Sync {
    /// Produces a summary draft for the given request.
    async fn summarize(&self, request: &SummaryRequest) -> PortResult<SummaryDraft>;
}
