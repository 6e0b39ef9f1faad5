//! services/app/src/adapters/file_storage.rs
//!
//! This module contains the file-backed storage adapter, the concrete implementation
//! of the `StateStorage` port used by the running service. Each key is one JSON file
//! in the storage directory.

use std::io;
use std::path::{Path, PathBuf};
use summarizer_core::ports::{PortError, PortResult, StateStorage};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

enum WriteJob {
    Write { path: PathBuf, value: String },
    Flush(oneshot::Sender<()>),
}

/// A storage adapter that implements the `StateStorage` port on the local file system.
///
/// Writes are handed to a background task and applied in order, so callers never
/// wait on the disk. Reads go straight to the file and are meant for startup, before
/// any write has been queued.
#[derive(Clone)]
pub struct FileStorage {
    dir: PathBuf,
    writer: mpsc::UnboundedSender<WriteJob>,
}

impl FileStorage {
    /// Creates the storage directory if needed and starts the background writer.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn open(dir: impl Into<PathBuf>) -> io::Result<(Self, JoinHandle<()>)> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;

        let (writer, jobs) = mpsc::unbounded_channel();
        let handle = tokio::spawn(write_loop(jobs));
        Ok((Self { dir, writer }, handle))
    }

    /// Waits until every write queued so far has been applied.
    pub async fn flush(&self) -> PortResult<()> {
        let (ack, done) = oneshot::channel();
        self.writer
            .send(WriteJob::Flush(ack))
            .map_err(|_| PortError::Storage("storage writer has stopped".to_string()))?;
        done.await
            .map_err(|_| PortError::Storage("storage writer has stopped".to_string()))
    }

    fn path_for(&self, key: &str) -> PortResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(PortError::InvalidInput(format!("unusable storage key {key:?}")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

//=========================================================================================
// `StateStorage` Trait Implementation
//=========================================================================================

impl StateStorage for FileStorage {
    fn read(&self, key: &str) -> PortResult<Option<String>> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PortError::Storage(format!(
                "failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn write(&self, key: &str, value: &str) -> PortResult<()> {
        let path = self.path_for(key)?;
        self.writer
            .send(WriteJob::Write {
                path,
                value: value.to_string(),
            })
            .map_err(|_| PortError::Storage("storage writer has stopped".to_string()))
    }
}

//=========================================================================================
// Background Writer
//=========================================================================================

/// Applies queued writes until every `FileStorage` handle has been dropped.
async fn write_loop(mut jobs: mpsc::UnboundedReceiver<WriteJob>) {
    while let Some(job) = jobs.recv().await {
        match job {
            WriteJob::Write { path, value } => match write_atomically(&path, &value).await {
                Ok(()) => debug!("Wrote {}", path.display()),
                Err(e) => error!("Failed to write {}: {}", path.display(), e),
            },
            WriteJob::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
    debug!("Storage writer stopped.");
}

/// Writes to a sibling temp file and renames it over the target, so readers only
/// ever see a complete record.
async fn write_atomically(path: &Path, value: &str) -> io::Result<()> {
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, value).await?;
    tokio::fs::rename(&tmp, path).await
}
