//! crates/summarizer_core/src/state.rs
//!
//! The aggregate application state and the snapshot handed to observers.

use serde::Serialize;

use crate::domain::{Summary, YouTubeVideo};
use crate::seed::seed_summaries;

/// The whole application state.
///
/// The selection is held as a summary id and always names a summary in
/// `summaries`; [`AppState::current_summary`] resolves it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub(crate) is_dark_mode: bool,
    pub(crate) is_sidebar_open: bool,
    pub(crate) summaries: Vec<Summary>,
    pub(crate) current_summary_id: Option<String>,
    pub(crate) is_loading: bool,
    pub(crate) youtube_videos: Vec<YouTubeVideo>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_persisted(false, seed_summaries())
    }
}

impl AppState {
    /// Builds a state from the persisted subset; everything else starts from defaults.
    pub(crate) fn with_persisted(is_dark_mode: bool, summaries: Vec<Summary>) -> Self {
        Self {
            is_dark_mode,
            is_sidebar_open: true,
            summaries,
            current_summary_id: None,
            is_loading: false,
            youtube_videos: Vec::new(),
        }
    }

    pub fn is_dark_mode(&self) -> bool {
        self.is_dark_mode
    }

    pub fn is_sidebar_open(&self) -> bool {
        self.is_sidebar_open
    }

    /// All summaries, most recently created first.
    pub fn summaries(&self) -> &[Summary] {
        &self.summaries
    }

    pub fn summary(&self, id: &str) -> Option<&Summary> {
        self.summaries.iter().find(|s| s.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.summary(id).is_some()
    }

    pub fn current_summary_id(&self) -> Option<&str> {
        self.current_summary_id.as_deref()
    }

    /// The summary currently shown, if any.
    pub fn current_summary(&self) -> Option<&Summary> {
        self.current_summary_id
            .as_deref()
            .and_then(|id| self.summary(id))
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn youtube_videos(&self) -> &[YouTubeVideo] {
        &self.youtube_videos
    }

    /// A serializable view with the selection resolved to the full record.
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            is_dark_mode: self.is_dark_mode,
            is_sidebar_open: self.is_sidebar_open,
            summaries: &self.summaries,
            current_summary: self.current_summary(),
            is_loading: self.is_loading,
            youtube_videos: &self.youtube_videos,
        }
    }
}

/// The wire shape of the state as read by view components.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot<'a> {
    pub is_dark_mode: bool,
    pub is_sidebar_open: bool,
    pub summaries: &'a [Summary],
    pub current_summary: Option<&'a Summary>,
    pub is_loading: bool,
    pub youtube_videos: &'a [YouTubeVideo],
}
