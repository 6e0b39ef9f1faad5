//! crates/summarizer_core/src/store.rs
//!
//! The state store: holds the single `AppState`, applies mutations one at a time,
//! notifies subscribers synchronously and hands the persisted subset to storage
//! after every change that touches it.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use tracing::{debug, error, info, warn};

use crate::domain::{Summary, SummaryDraft, SummaryPatch, YouTubeVideo};
use crate::persistence::{
    self, MemoryStorage, PersistedState, PersistenceError, RehydrationOutcome, STORAGE_KEY,
};
use crate::ports::StateStorage;
use crate::state::AppState;

//=========================================================================================
// Actions and Errors
//=========================================================================================

/// Every state transition the store accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    ToggleTheme,
    ToggleSidebar,
    AddSummary(SummaryDraft),
    UpdateSummary { id: String, patch: SummaryPatch },
    DeleteSummary(String),
    ToggleFavorite(String),
    SetCurrentSummary(Option<String>),
    SetIsLoading(bool),
    SetYoutubeVideos(Vec<YouTubeVideo>),
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::ToggleTheme => "toggle_theme",
            Action::ToggleSidebar => "toggle_sidebar",
            Action::AddSummary(_) => "add_summary",
            Action::UpdateSummary { .. } => "update_summary",
            Action::DeleteSummary(_) => "delete_summary",
            Action::ToggleFavorite(_) => "toggle_favorite",
            Action::SetCurrentSummary(_) => "set_current_summary",
            Action::SetIsLoading(_) => "set_is_loading",
            Action::SetYoutubeVideos(_) => "set_youtube_videos",
        }
    }
}

/// Returned when a selection names a summary that is not in the collection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("summary {0:?} is not in the collection")]
    UnknownSummary(String),
}

/// What a single applied action changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Change {
    None,
    Transient,
    Persisted,
}

//=========================================================================================
// Subscriptions
//=========================================================================================

/// Handed to listeners so they can queue follow-up mutations.
///
/// Queued actions run after the current notification round, in the order queued,
/// before the mutation that triggered the round returns.
#[derive(Debug, Default)]
pub struct Dispatcher {
    queued: VecDeque<Action>,
}

impl Dispatcher {
    pub fn dispatch(&mut self, action: Action) {
        self.queued.push_back(action);
    }
}

/// Identifies a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

trait Listener: Send {
    fn notify(&mut self, state: &AppState, dispatcher: &mut Dispatcher);
}

struct WholeState<F>(F);

impl<F> Listener for WholeState<F>
where
    F: FnMut(&AppState, &mut Dispatcher) + Send,
{
    fn notify(&mut self, state: &AppState, dispatcher: &mut Dispatcher) {
        (self.0)(state, dispatcher)
    }
}

struct Slice<T, S, F> {
    selector: S,
    last: T,
    listener: F,
}

impl<T, S, F> Listener for Slice<T, S, F>
where
    T: PartialEq + Send,
    S: Fn(&AppState) -> T + Send,
    F: FnMut(&T, &AppState, &mut Dispatcher) + Send,
{
    fn notify(&mut self, state: &AppState, dispatcher: &mut Dispatcher) {
        let next = (self.selector)(state);
        if next != self.last {
            self.last = next;
            (self.listener)(&self.last, state, dispatcher);
        }
    }
}

//=========================================================================================
// Id Generation
//=========================================================================================

/// Issues summary ids from a millisecond clock that never goes backwards and
/// never repeats a value present in the collection.
#[derive(Debug)]
struct IdGenerator {
    last: u64,
}

impl IdGenerator {
    fn seeded(summaries: &[Summary]) -> Self {
        let last = summaries
            .iter()
            .filter_map(|s| s.id().parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        Self { last }
    }

    fn next(&mut self, summaries: &[Summary], now: DateTime<Utc>) -> String {
        let taken = |id: &str| summaries.iter().any(|s| s.id() == id);
        let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);

        let mut candidate = self.last.checked_add(1).map(|next| next.max(millis));
        while let Some(value) = candidate {
            let id = value.to_string();
            if !taken(&id) {
                self.last = value;
                return id;
            }
            candidate = value.checked_add(1);
        }

        // No numeric id is left above `last`; fall back to suffixed ids.
        let mut suffix: u64 = 1;
        loop {
            let id = format!("{millis}-{suffix}");
            if !taken(&id) {
                return id;
            }
            suffix = suffix.saturating_add(1);
        }
    }
}

//=========================================================================================
// The Store
//=========================================================================================

/// The single source of truth for application state.
///
/// A `Store` is an ordinary value: construct one, hand it (or a handle to it) to
/// every consumer. All mutations take `&mut self`, so exactly one runs at a time.
pub struct Store {
    state: AppState,
    listeners: Vec<(SubscriptionId, Box<dyn Listener>)>,
    next_subscription: u64,
    queue: VecDeque<Action>,
    storage: Box<dyn StateStorage>,
    persistence_suspended: bool,
    rehydration: RehydrationOutcome,
    ids: IdGenerator,
}

impl Store {
    /// Rehydrates from `storage` and returns a store writing back to it.
    ///
    /// An undecodable record is first copied to a free quarantine slot (see
    /// [`persistence::quarantine`]). If that copy fails, or storage could not be
    /// read, persistence is suspended so the existing record is never overwritten.
    pub fn open(storage: impl StateStorage + 'static) -> Self {
        let rehydration = persistence::rehydrate(&storage);

        let persistence_suspended = match &rehydration.outcome {
            RehydrationOutcome::Restored | RehydrationOutcome::FirstRun => false,
            RehydrationOutcome::Recovered { raw, .. } => {
                match persistence::quarantine(&storage, raw) {
                    Ok(key) => {
                        info!("Copied undecodable stored state to {}", key);
                        false
                    }
                    Err(e) => {
                        error!(
                            "Could not preserve undecodable stored state, persistence suspended: {}",
                            e
                        );
                        true
                    }
                }
            }
            RehydrationOutcome::Unavailable { .. } => {
                error!("Stored state is unreadable, persistence suspended.");
                true
            }
        };

        let state = rehydration.state.into_app_state();
        Self {
            ids: IdGenerator::seeded(&state.summaries),
            state,
            listeners: Vec::new(),
            next_subscription: 0,
            queue: VecDeque::new(),
            storage: Box::new(storage),
            persistence_suspended,
            rehydration: rehydration.outcome,
        }
    }

    /// A store backed by fresh in-memory storage, starting from the seed dataset.
    pub fn in_memory() -> Self {
        Self::open(MemoryStorage::new())
    }

    /// A store starting from `persisted`, writing to `storage`. Nothing is read.
    ///
    /// `persisted` is checked the same way a stored record is.
    pub fn with_state(
        persisted: PersistedState,
        storage: impl StateStorage + 'static,
    ) -> Result<Self, PersistenceError> {
        persisted.validate()?;
        let state = persisted.into_app_state();
        Ok(Self {
            ids: IdGenerator::seeded(&state.summaries),
            state,
            listeners: Vec::new(),
            next_subscription: 0,
            queue: VecDeque::new(),
            storage: Box::new(storage),
            persistence_suspended: false,
            rehydration: RehydrationOutcome::Restored,
        })
    }

    /// The current snapshot.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn rehydration(&self) -> &RehydrationOutcome {
        &self.rehydration
    }

    pub fn is_persistence_suspended(&self) -> bool {
        self.persistence_suspended
    }

    // --- Subscriptions ---

    /// Registers a listener called after every change to the state.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&AppState, &mut Dispatcher) + Send + 'static,
    {
        self.register(Box::new(WholeState(listener)))
    }

    /// Registers a listener called only when `selector`'s value changes.
    pub fn subscribe_slice<T, S, F>(&mut self, selector: S, listener: F) -> SubscriptionId
    where
        T: PartialEq + Send + 'static,
        S: Fn(&AppState) -> T + Send + 'static,
        F: FnMut(&T, &AppState, &mut Dispatcher) + Send + 'static,
    {
        let last = selector(&self.state);
        self.register(Box::new(Slice {
            selector,
            last,
            listener,
        }))
    }

    /// Removes a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    fn register(&mut self, listener: Box<dyn Listener>) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, listener));
        id
    }

    // --- Mutations ---

    pub fn toggle_theme(&mut self) {
        self.dispatch_total(Action::ToggleTheme);
    }

    pub fn toggle_sidebar(&mut self) {
        self.dispatch_total(Action::ToggleSidebar);
    }

    /// Stamps `draft` with a fresh id and the current time and inserts it first.
    pub fn add_summary(&mut self, draft: SummaryDraft) {
        self.dispatch_total(Action::AddSummary(draft));
    }

    /// Applies `patch` to the summary with `id`. Unknown ids are ignored.
    pub fn update_summary(&mut self, id: &str, patch: SummaryPatch) {
        self.dispatch_total(Action::UpdateSummary {
            id: id.to_string(),
            patch,
        });
    }

    /// Removes the summary with `id`, clearing the selection if it was selected.
    pub fn delete_summary(&mut self, id: &str) {
        self.dispatch_total(Action::DeleteSummary(id.to_string()));
    }

    pub fn toggle_favorite(&mut self, id: &str) {
        self.dispatch_total(Action::ToggleFavorite(id.to_string()));
    }

    /// Selects the summary with `id`, or clears the selection with `None`.
    pub fn set_current_summary(&mut self, id: Option<&str>) -> Result<(), SelectionError> {
        self.dispatch(Action::SetCurrentSummary(id.map(str::to_string)))
    }

    pub fn set_is_loading(&mut self, loading: bool) {
        self.dispatch_total(Action::SetIsLoading(loading));
    }

    pub fn set_youtube_videos(&mut self, videos: Vec<YouTubeVideo>) {
        self.dispatch_total(Action::SetYoutubeVideos(videos));
    }

    /// Applies `action`, then everything listeners queue in response.
    ///
    /// Only a rejected selection in `action` itself is reported; a rejected
    /// selection queued by a listener is logged and dropped.
    pub fn dispatch(&mut self, action: Action) -> Result<(), SelectionError> {
        let result = self.step(action);
        while let Some(queued) = self.queue.pop_front() {
            if let Err(e) = self.step(queued) {
                warn!("Queued mutation rejected: {}", e);
            }
        }
        result
    }

    fn dispatch_total(&mut self, action: Action) {
        if let Err(e) = self.dispatch(action) {
            warn!("Mutation rejected: {}", e);
        }
    }

    fn step(&mut self, action: Action) -> Result<(), SelectionError> {
        let name = action.name();
        let change = self.apply(action)?;
        debug!(action = name, ?change, "Applied mutation");

        if change == Change::None {
            return Ok(());
        }
        if change == Change::Persisted {
            self.persist();
        }
        self.notify();
        Ok(())
    }

    fn apply(&mut self, action: Action) -> Result<Change, SelectionError> {
        let state = &mut self.state;
        let change = match action {
            Action::ToggleTheme => {
                state.is_dark_mode = !state.is_dark_mode;
                Change::Persisted
            }
            Action::ToggleSidebar => {
                state.is_sidebar_open = !state.is_sidebar_open;
                Change::Transient
            }
            Action::AddSummary(draft) => {
                let now = Utc::now();
                let id = self.ids.next(&state.summaries, now);
                let summary = Summary::from_draft(id, now, draft);
                state.summaries.insert(0, summary);
                Change::Persisted
            }
            Action::UpdateSummary { id, patch } => {
                let changed = state
                    .summaries
                    .iter_mut()
                    .find(|s| s.id() == id)
                    .is_some_and(|summary| summary.apply(patch));
                if changed {
                    Change::Persisted
                } else {
                    Change::None
                }
            }
            Action::DeleteSummary(id) => {
                match state.summaries.iter().position(|s| s.id() == id) {
                    Some(index) => {
                        state.summaries.remove(index);
                        if state.current_summary_id.as_deref() == Some(id.as_str()) {
                            state.current_summary_id = None;
                        }
                        Change::Persisted
                    }
                    None => Change::None,
                }
            }
            Action::ToggleFavorite(id) => {
                match state.summaries.iter_mut().find(|s| s.id() == id) {
                    Some(summary) => {
                        summary.is_favorite = !summary.is_favorite;
                        Change::Persisted
                    }
                    None => Change::None,
                }
            }
            Action::SetCurrentSummary(selection) => {
                if let Some(id) = &selection {
                    if !state.contains(id) {
                        return Err(SelectionError::UnknownSummary(id.clone()));
                    }
                }
                if state.current_summary_id == selection {
                    Change::None
                } else {
                    state.current_summary_id = selection;
                    Change::Transient
                }
            }
            Action::SetIsLoading(loading) => {
                if state.is_loading == loading {
                    Change::None
                } else {
                    state.is_loading = loading;
                    Change::Transient
                }
            }
            Action::SetYoutubeVideos(videos) => {
                if state.youtube_videos == videos {
                    Change::None
                } else {
                    state.youtube_videos = videos;
                    Change::Transient
                }
            }
        };
        Ok(change)
    }

    /// Fire-and-forget: a failed write is logged, never returned.
    fn persist(&self) {
        if self.persistence_suspended {
            return;
        }
        match persistence::encode(&self.state) {
            Ok(raw) => {
                if let Err(e) = self.storage.write(STORAGE_KEY, &raw) {
                    warn!("Failed to persist state: {}", e);
                }
            }
            Err(e) => warn!("Failed to encode state: {}", e),
        }
    }

    fn notify(&mut self) {
        let mut dispatcher = Dispatcher::default();
        for (_, listener) in self.listeners.iter_mut() {
            listener.notify(&self.state, &mut dispatcher);
        }
        self.queue.extend(dispatcher.queued);
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.state)
            .field("listeners", &self.listeners.len())
            .field("persistence_suspended", &self.persistence_suspended)
            .finish()
    }
}
