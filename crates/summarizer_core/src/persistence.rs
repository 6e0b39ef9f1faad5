//! crates/summarizer_core/src/persistence.rs
//!
//! The durable half of the store: which fields survive a restart, how they are
//! encoded, and how they are read back at startup.
//!
//! Only the fields listed in [`PersistedState`] are ever written. The stored record
//! is a JSON envelope `{"state": {...}, "version": 0}` under [`STORAGE_KEY`].

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::Summary;
use crate::ports::{PortError, PortResult, StateStorage};
use crate::seed::seed_summaries;
use crate::state::AppState;

/// The namespace under which the persisted subset is stored.
pub const STORAGE_KEY: &str = "ai-summarizer-storage";

/// Where an undecodable record is copied before the store writes over it.
/// When this slot already holds a different record, `<QUARANTINE_KEY>.1`,
/// `<QUARANTINE_KEY>.2` and so on are used.
pub const QUARANTINE_KEY: &str = "ai-summarizer-storage.corrupt";

/// How many quarantine slots are tried before giving up.
pub const QUARANTINE_SLOTS: usize = 32;

/// The envelope version this build reads and writes.
pub const STORAGE_VERSION: u32 = 0;

//=========================================================================================
// The Persisted Subset
//=========================================================================================

/// The allow-list of state that survives restarts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    pub is_dark_mode: bool,
    pub summaries: Vec<Summary>,
}

impl PersistedState {
    pub fn seed() -> Self {
        Self {
            is_dark_mode: false,
            summaries: seed_summaries(),
        }
    }

    /// Rejects a subset that would break the store's invariants.
    pub fn validate(&self) -> Result<(), PersistenceError> {
        let mut seen = HashSet::new();
        for summary in &self.summaries {
            if !seen.insert(summary.id()) {
                return Err(PersistenceError::DuplicateId(summary.id().to_string()));
            }
        }
        Ok(())
    }

    pub fn into_app_state(self) -> AppState {
        AppState::with_persisted(self.is_dark_mode, self.summaries)
    }
}

/// Borrowed form of [`PersistedState`] so encoding never clones the summaries.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PersistedStateRef<'a> {
    is_dark_mode: bool,
    summaries: &'a [Summary],
}

#[derive(Serialize)]
struct EnvelopeOut<'a> {
    state: PersistedStateRef<'a>,
    version: u32,
}

#[derive(Deserialize)]
struct EnvelopeIn {
    state: PersistedState,
    #[serde(default)]
    version: u32,
}

//=========================================================================================
// Encoding
//=========================================================================================

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("stored state is not valid: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("stored state has unsupported version {0}")]
    UnsupportedVersion(u32),
    #[error("stored state contains duplicate summary id {0:?}")]
    DuplicateId(String),
}

/// Serializes the persisted subset of `state`.
pub fn encode(state: &AppState) -> Result<String, PersistenceError> {
    let envelope = EnvelopeOut {
        state: PersistedStateRef {
            is_dark_mode: state.is_dark_mode,
            summaries: &state.summaries,
        },
        version: STORAGE_VERSION,
    };
    Ok(serde_json::to_string(&envelope)?)
}

/// Parses a stored record, rejecting anything that would break the store's invariants.
pub fn decode(raw: &str) -> Result<PersistedState, PersistenceError> {
    let envelope: EnvelopeIn = serde_json::from_str(raw)?;
    if envelope.version != STORAGE_VERSION {
        return Err(PersistenceError::UnsupportedVersion(envelope.version));
    }
    envelope.state.validate()?;
    Ok(envelope.state)
}

/// Copies an undecodable record into the first quarantine slot that is free or
/// already holds the same record. Returns the key it now lives under.
pub fn quarantine(storage: &dyn StateStorage, raw: &str) -> PortResult<String> {
    for slot in 0..QUARANTINE_SLOTS {
        let key = match slot {
            0 => QUARANTINE_KEY.to_string(),
            n => format!("{QUARANTINE_KEY}.{n}"),
        };
        match storage.read(&key)? {
            None => {
                storage.write(&key, raw)?;
                return Ok(key);
            }
            Some(existing) if existing == raw => return Ok(key),
            Some(_) => {}
        }
    }
    Err(PortError::Storage(format!(
        "all {QUARANTINE_SLOTS} quarantine slots are taken"
    )))
}

//=========================================================================================
// Rehydration
//=========================================================================================

/// How the startup state was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RehydrationOutcome {
    /// The stored record was decoded.
    Restored,
    /// Nothing was stored; the seed dataset is used.
    FirstRun,
    /// The stored record could not be decoded; the seed dataset is used.
    /// `raw` is the untouched record.
    Recovered { reason: String, raw: String },
    /// Storage could not be read at all; the seed dataset is used.
    Unavailable { reason: String },
}

#[derive(Debug, Clone)]
pub struct Rehydration {
    pub state: PersistedState,
    pub outcome: RehydrationOutcome,
}

/// Reads the persisted subset once. Never fails: every failure falls back to the seed.
pub fn rehydrate(storage: &dyn StateStorage) -> Rehydration {
    match storage.read(STORAGE_KEY) {
        Ok(None) => {
            info!("No stored state found, starting from seed data.");
            Rehydration {
                state: PersistedState::seed(),
                outcome: RehydrationOutcome::FirstRun,
            }
        }
        Ok(Some(raw)) => match decode(&raw) {
            Ok(state) => {
                debug!(summaries = state.summaries.len(), "Restored stored state.");
                Rehydration {
                    state,
                    outcome: RehydrationOutcome::Restored,
                }
            }
            Err(e) => {
                warn!("Stored state could not be decoded, starting from seed data: {}", e);
                Rehydration {
                    state: PersistedState::seed(),
                    outcome: RehydrationOutcome::Recovered {
                        reason: e.to_string(),
                        raw,
                    },
                }
            }
        },
        Err(e) => {
            warn!("Stored state could not be read, starting from seed data: {}", e);
            Rehydration {
                state: PersistedState::seed(),
                outcome: RehydrationOutcome::Unavailable {
                    reason: e.to_string(),
                },
            }
        }
    }
}

//=========================================================================================
// In-memory Storage
//=========================================================================================

/// A `StateStorage` kept in process memory.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// A storage that already holds `value` under `key`.
    pub fn with_value(key: &str, value: &str) -> Self {
        let storage = Self::default();
        if let Ok(mut values) = storage.values.lock() {
            values.insert(key.to_string(), value.to_string());
        }
        storage
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.values.lock().ok()?.get(key).cloned()
    }
}

impl StateStorage for MemoryStorage {
    fn read(&self, key: &str) -> PortResult<Option<String>> {
        let values = self
            .values
            .lock()
            .map_err(|e| PortError::Storage(e.to_string()))?;
        Ok(values.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> PortResult<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|e| PortError::Storage(e.to_string()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

impl<T: StateStorage + ?Sized> StateStorage for std::sync::Arc<T> {
    fn read(&self, key: &str) -> PortResult<Option<String>> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> PortResult<()> {
        (**self).write(key, value)
    }
}
