//! services/app/src/web/state.rs
//!
//! Defines the server state shared by every handler and connection.

use crate::config::Config;
use crate::jobs::JobRunner;
use crate::web::protocol::snapshot_message;
use crate::SharedStore;
use std::sync::Arc;
use summarizer_core::{Store, SummarizationService};
use tokio::sync::{watch, Mutex};
use tracing::warn;

//=========================================================================================
// ServerState (Shared Across All Connections)
//=========================================================================================

/// The shared server state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct ServerState {
    pub store: SharedStore,
    pub config: Arc<Config>,
    pub jobs: JobRunner,
    /// The latest snapshot message, republished after every store change.
    pub snapshots: watch::Receiver<String>,
}

impl ServerState {
    /// Takes ownership of `store` and wires the snapshot feed to it.
    pub fn new(
        mut store: Store,
        summarizer: Arc<dyn SummarizationService>,
        config: Arc<Config>,
    ) -> Self {
        let initial = snapshot_message(store.state()).unwrap_or_default();
        let (publisher, snapshots) = watch::channel(initial);

        store.subscribe(move |state, _| match snapshot_message(state) {
            Ok(message) => {
                publisher.send_replace(message);
            }
            Err(e) => warn!("Failed to serialize snapshot: {}", e),
        });

        let store: SharedStore = Arc::new(Mutex::new(store));
        let jobs = JobRunner::new(store.clone(), summarizer);
        Self {
            store,
            config,
            jobs,
            snapshots,
        }
    }
}
