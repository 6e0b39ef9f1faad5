//! services/app/src/jobs.rs
//!
//! Runs summarization requests in the background and feeds successful results into
//! the store.
//!
//! Each request becomes a job with its own `CancellationToken`. Starting a job
//! cancels the one in flight, so only the newest request can add a summary or
//! clear the loading flag.

use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use summarizer_core::{PortResult, SummarizationService, SummaryRequest};
use tokio::sync::{oneshot, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::SharedStore;

/// Where a job stands. Every job ends in exactly one terminal status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Completed { summary_id: String },
    Failed { reason: String },
    Cancelled,
}

/// A handle to a started job.
#[derive(Debug)]
pub struct SummaryJob {
    pub id: Uuid,
    outcome: oneshot::Receiver<JobStatus>,
}

impl SummaryJob {
    /// Waits for the job's terminal status.
    pub async fn outcome(self) -> JobStatus {
        self.outcome.await.unwrap_or(JobStatus::Cancelled)
    }
}

/// How many finished jobs keep a queryable status.
pub const FINISHED_JOB_HISTORY: usize = 64;

#[derive(Default)]
struct JobBoard {
    active: Option<(Uuid, CancellationToken)>,
    statuses: HashMap<Uuid, JobStatus>,
    /// Finished job ids, oldest first.
    finished: VecDeque<Uuid>,
}

impl JobBoard {
    fn finish(&mut self, id: Uuid, status: JobStatus) {
        self.statuses.insert(id, status);
        self.finished.push_back(id);
        while self.finished.len() > FINISHED_JOB_HISTORY {
            if let Some(oldest) = self.finished.pop_front() {
                self.statuses.remove(&oldest);
            }
        }
    }
}

/// Starts jobs and tracks their statuses.
#[derive(Clone)]
pub struct JobRunner {
    store: SharedStore,
    service: Arc<dyn SummarizationService>,
    board: Arc<Mutex<JobBoard>>,
}

impl JobRunner {
    pub fn new(store: SharedStore, service: Arc<dyn SummarizationService>) -> Self {
        Self {
            store,
            service,
            board: Arc::new(Mutex::new(JobBoard::default())),
        }
    }

    /// Validates `request`, supersedes any job in flight and starts a new one.
    pub async fn start(&self, request: SummaryRequest) -> PortResult<SummaryJob> {
        request.validate()?;

        let id = Uuid::new_v4();
        let token = CancellationToken::new();
        {
            let mut board = self.board.lock().await;
            if let Some((previous, previous_token)) = board.active.replace((id, token.clone())) {
                info!("Job {} superseded by {}", previous, id);
                previous_token.cancel();
            }
            board.statuses.insert(id, JobStatus::Pending);
        }
        self.store.lock().await.set_is_loading(true);

        let (sender, outcome) = oneshot::channel();
        let runner = self.clone();
        tokio::spawn(async move {
            let status = runner.run(id, request, token).await;
            let _ = sender.send(status);
        });

        info!("Job {} started.", id);
        Ok(SummaryJob { id, outcome })
    }

    /// The last known status of job `id`. Only the most recent
    /// [`FINISHED_JOB_HISTORY`] finished jobs are remembered.
    pub async fn status(&self, id: Uuid) -> Option<JobStatus> {
        self.board.lock().await.statuses.get(&id).cloned()
    }

    async fn run(&self, id: Uuid, request: SummaryRequest, token: CancellationToken) -> JobStatus {
        let result = tokio::select! {
            _ = token.cancelled() => None,
            result = self.service.summarize(&request) => Some(result),
        };

        let mut store = self.store.lock().await;
        let mut board = self.board.lock().await;
        let still_current = matches!(&board.active, Some((active, _)) if *active == id);
        if still_current {
            board.active = None;
        }

        let status = match result {
            Some(Ok(draft)) if !token.is_cancelled() => {
                store.add_summary(draft);
                let summary_id = store
                    .state()
                    .summaries()
                    .first()
                    .map(|s| s.id().to_string())
                    .unwrap_or_default();
                info!("Job {} completed with summary {}", id, summary_id);
                JobStatus::Completed { summary_id }
            }
            Some(Err(e)) if !token.is_cancelled() => {
                error!("Job {} failed: {}", id, e);
                JobStatus::Failed {
                    reason: e.to_string(),
                }
            }
            _ => {
                info!("Job {} cancelled.", id);
                JobStatus::Cancelled
            }
        };

        if still_current {
            store.set_is_loading(false);
        }
        board.finish(id, status.clone());
        status
    }
}
