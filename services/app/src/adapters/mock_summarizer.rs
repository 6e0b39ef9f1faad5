//! services/app/src/adapters/mock_summarizer.rs
//!
//! This module contains the placeholder summarization adapter.
//! It implements the `SummarizationService` port from the `core` crate without
//! contacting any backend: after a fixed delay it returns canned text shaped by the
//! request's options.

use async_trait::async_trait;
use std::time::Duration;
use summarizer_core::{
    domain::{SummaryDraft, SummaryInput, SummaryRequest},
    ports::{PortResult, SummarizationService},
};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `SummarizationService` with a timed stub.
#[derive(Clone, Debug)]
pub struct MockSummarizer {
    delay: Duration,
}

impl MockSummarizer {
    /// Creates a new `MockSummarizer` that finishes after `delay`.
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

/// The canned draft produced for `request`.
pub fn placeholder_draft(request: &SummaryRequest) -> SummaryDraft {
    let options = request.options;
    let (label, source) = match &request.input {
        SummaryInput::Url(url) => ("URL", url.clone()),
        SummaryInput::YouTubeSearch(_) => ("YouTube Video", "YouTube Search".to_string()),
        SummaryInput::Text(_) => ("Text Content", "Text Input".to_string()),
    };

    SummaryDraft {
        title: format!("Summary of {}", label),
        content: format!(
            "This is a {} summary written for {} level. The content has been processed and summarized according to your specifications.",
            options.summary_length, options.knowledge_level
        ),
        source,
        source_type: request.input.source_type(),
        output_type: options.output_type,
        summary_length: options.summary_length,
        knowledge_level: options.knowledge_level,
        is_favorite: false,
        tags: vec![
            request.input.tab().to_string(),
            options.summary_length.to_string(),
            options.knowledge_level.to_string(),
        ],
    }
}

//=========================================================================================
// `SummarizationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl SummarizationService for MockSummarizer {
    async fn summarize(&self, request: &SummaryRequest) -> PortResult<SummaryDraft> {
        request.validate()?;
        tokio::time::sleep(self.delay).await;
        Ok(placeholder_draft(request))
    }
}
