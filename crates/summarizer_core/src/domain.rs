//! crates/summarizer_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application: summaries,
//! the drafts and patches used to create and edit them, and summarization requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ports::{PortError, PortResult};

//=========================================================================================
// Enumerations
//=========================================================================================

/// Where the summarized material came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Video,
    Article,
    Text,
}

/// The medium a summary is produced in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputType {
    #[default]
    Text,
    Video,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryLength {
    Short,
    #[default]
    Medium,
    Long,
}

/// The reader expertise a summary is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KnowledgeLevel {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl SummaryLength {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryLength::Short => "short",
            SummaryLength::Medium => "medium",
            SummaryLength::Long => "long",
        }
    }
}

impl KnowledgeLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            KnowledgeLevel::Beginner => "beginner",
            KnowledgeLevel::Intermediate => "intermediate",
            KnowledgeLevel::Advanced => "advanced",
        }
    }
}

impl fmt::Display for SummaryLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for KnowledgeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//=========================================================================================
// Summaries
//=========================================================================================

/// A stored summary and its metadata.
///
/// `id` and `created_at` are assigned by the store when the summary is added and
/// cannot be changed afterwards; there is no public way to build a `Summary` with
/// arbitrary values other than deserializing a persisted record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub(crate) id: String,
    pub title: String,
    pub content: String,
    pub source: String,
    pub source_type: SourceType,
    pub output_type: OutputType,
    pub summary_length: SummaryLength,
    pub knowledge_level: KnowledgeLevel,
    pub(crate) created_at: DateTime<Utc>,
    pub is_favorite: bool,
    pub tags: Vec<String>,
}

impl Summary {
    /// Stamps a draft with its identity. Only the store calls this.
    pub(crate) fn from_draft(id: String, created_at: DateTime<Utc>, draft: SummaryDraft) -> Self {
        Self {
            id,
            title: draft.title,
            content: draft.content,
            source: draft.source,
            source_type: draft.source_type,
            output_type: draft.output_type,
            summary_length: draft.summary_length,
            knowledge_level: draft.knowledge_level,
            created_at,
            is_favorite: draft.is_favorite,
            tags: draft.tags,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Applies every field set in `patch`. Returns `true` if anything changed.
    pub(crate) fn apply(&mut self, patch: SummaryPatch) -> bool {
        let before = self.clone();
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(source) = patch.source {
            self.source = source;
        }
        if let Some(source_type) = patch.source_type {
            self.source_type = source_type;
        }
        if let Some(output_type) = patch.output_type {
            self.output_type = output_type;
        }
        if let Some(summary_length) = patch.summary_length {
            self.summary_length = summary_length;
        }
        if let Some(knowledge_level) = patch.knowledge_level {
            self.knowledge_level = knowledge_level;
        }
        if let Some(is_favorite) = patch.is_favorite {
            self.is_favorite = is_favorite;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        *self != before
    }
}

/// A summary as supplied by a caller, before the store assigns `id` and `createdAt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SummaryDraft {
    pub title: String,
    pub content: String,
    pub source: String,
    pub source_type: SourceType,
    pub output_type: OutputType,
    pub summary_length: SummaryLength,
    pub knowledge_level: KnowledgeLevel,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A partial update. Only the fields that are `Some` are written; `id` and
/// `createdAt` are deliberately absent and rejected when deserializing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SummaryPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_type: Option<SourceType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_type: Option<OutputType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_length: Option<SummaryLength>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knowledge_level: Option<KnowledgeLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// A transient YouTube search result. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YouTubeVideo {
    pub id: String,
    pub title: String,
    pub thumbnail: String,
    pub channel_title: String,
    pub published_at: String,
    pub duration: String,
}

//=========================================================================================
// Summarization Requests
//=========================================================================================

/// The material a user asked to summarize, one variant per input tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SummaryInput {
    Url(String),
    YouTubeSearch(String),
    Text(String),
}

impl SummaryInput {
    /// The short tab name, also used as the first tag of a generated summary.
    pub fn tab(&self) -> &'static str {
        match self {
            SummaryInput::Url(_) => "url",
            SummaryInput::YouTubeSearch(_) => "youtube",
            SummaryInput::Text(_) => "text",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            SummaryInput::Url(v) | SummaryInput::YouTubeSearch(v) | SummaryInput::Text(v) => v,
        }
    }

    pub fn source_type(&self) -> SourceType {
        match self {
            SummaryInput::Url(_) => SourceType::Article,
            SummaryInput::YouTubeSearch(_) => SourceType::Video,
            SummaryInput::Text(_) => SourceType::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryOptions {
    #[serde(default)]
    pub output_type: OutputType,
    #[serde(default)]
    pub summary_length: SummaryLength,
    #[serde(default)]
    pub knowledge_level: KnowledgeLevel,
}

/// A request to produce one summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRequest {
    pub input: SummaryInput,
    #[serde(default)]
    pub options: SummaryOptions,
}

impl SummaryRequest {
    pub fn new(input: SummaryInput, options: SummaryOptions) -> Self {
        Self { input, options }
    }

    /// Rejects requests with nothing to summarize.
    pub fn validate(&self) -> PortResult<()> {
        if self.input.value().trim().is_empty() {
            return Err(PortError::InvalidInput(format!(
                "the {} input is empty",
                self.input.tab()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn enumerations_use_lowercase_literals() {
        assert_eq!(serde_json::to_value(SourceType::Article).unwrap(), json!("article"));
        assert_eq!(serde_json::to_value(OutputType::Video).unwrap(), json!("video"));
        assert_eq!(serde_json::to_value(SummaryLength::Long).unwrap(), json!("long"));
        assert_eq!(
            serde_json::to_value(KnowledgeLevel::Intermediate).unwrap(),
            json!("intermediate")
        );
    }

    #[test]
    fn patch_rejects_identity_fields() {
        let with_id = json!({ "id": "9", "title": "x" });
        assert!(serde_json::from_value::<SummaryPatch>(with_id).is_err());

        let with_created_at = json!({ "createdAt": "2024-01-01T00:00:00Z" });
        assert!(serde_json::from_value::<SummaryPatch>(with_created_at).is_err());

        let ok = json!({ "isFavorite": true });
        let patch: SummaryPatch = serde_json::from_value(ok).unwrap();
        assert_eq!(patch.is_favorite, Some(true));
        assert!(patch.title.is_none());
    }

    #[test]
    fn blank_requests_are_invalid() {
        let request = SummaryRequest::new(SummaryInput::Url("   ".into()), SummaryOptions::default());
        assert!(matches!(request.validate(), Err(PortError::InvalidInput(_))));

        let request = SummaryRequest::new(
            SummaryInput::Text("Some pasted text".into()),
            SummaryOptions::default(),
        );
        assert!(request.validate().is_ok());
    }
}
