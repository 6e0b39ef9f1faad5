//! crates/summarizer_core/src/handoff.rs
//!
//! The one-shot handoff from a video page to the application: the browser extension
//! opens `<origin>/?video=<page url>&title=<heading>` in a new tab, and the
//! application turns those parameters into a prefilled summarization request.

use url::Url;

use crate::domain::{SummaryInput, SummaryOptions, SummaryRequest};
use crate::ports::{PortError, PortResult};

/// Used when no heading could be extracted from the page.
pub const FALLBACK_TITLE: &str = "YouTube Video";

/// The origin the extension opens when none is configured.
pub const DEFAULT_APP_ORIGIN: &str = "http://localhost:3000";

/// Whether `page` is a YouTube watch page, the only place the extension acts.
pub fn is_video_page(page: &Url) -> bool {
    page.host_str()
        .is_some_and(|host| host.contains("youtube.com"))
        && page.path().contains("/watch")
}

/// Builds the URL the extension opens for `page`.
///
/// Both parameters are percent-encoded; only RFC 3986 unreserved characters are kept.
pub fn handoff_url(origin: &Url, page: &Url, heading: Option<&str>) -> Url {
    let title = heading
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .unwrap_or(FALLBACK_TITLE);

    let mut url = origin.clone();
    url.set_query(Some(&format!(
        "video={}&title={}",
        urlencoding::encode(page.as_str()),
        urlencoding::encode(title)
    )));
    url
}

/// The parameters received on the application side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handoff {
    pub video: String,
    pub title: String,
}

impl Handoff {
    /// Reads the handoff parameters from a URL opened by the extension.
    pub fn from_url(url: &Url) -> PortResult<Self> {
        let mut video = None;
        let mut title = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "video" => video = Some(value.into_owned()),
                "title" => title = Some(value.into_owned()),
                _ => {}
            }
        }
        Self::from_params(video, title)
    }

    /// Builds a handoff from already-decoded parameters.
    pub fn from_params(video: Option<String>, title: Option<String>) -> PortResult<Self> {
        let video = video
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| PortError::InvalidInput("missing `video` parameter".to_string()))?;
        let title = title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| FALLBACK_TITLE.to_string());
        Ok(Self { video, title })
    }

    /// A request to summarize the handed-off page with default options.
    pub fn into_request(self) -> SummaryRequest {
        SummaryRequest::new(SummaryInput::Url(self.video), SummaryOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> Url {
        Url::parse(DEFAULT_APP_ORIGIN).unwrap()
    }

    #[test]
    fn recognizes_watch_pages_only() {
        let watch = Url::parse("https://www.youtube.com/watch?v=abc123").unwrap();
        let channel = Url::parse("https://www.youtube.com/@somechannel").unwrap();
        let other = Url::parse("https://example.com/watch").unwrap();
        assert!(is_video_page(&watch));
        assert!(!is_video_page(&channel));
        assert!(!is_video_page(&other));
    }

    #[test]
    fn encodes_both_parameters() {
        let page = Url::parse("https://www.youtube.com/watch?v=abc&t=10s").unwrap();
        let url = handoff_url(&origin(), &page, Some("Rust & You: Part 1"));
        assert_eq!(
            url.as_str(),
            "http://localhost:3000/?video=https%3A%2F%2Fwww.youtube.com%2Fwatch%3Fv%3Dabc%26t%3D10s&title=Rust%20%26%20You%3A%20Part%201"
        );
    }

    #[test]
    fn blank_heading_falls_back() {
        let page = Url::parse("https://www.youtube.com/watch?v=abc").unwrap();
        let url = handoff_url(&origin(), &page, Some("   \n"));
        let handoff = Handoff::from_url(&url).unwrap();
        assert_eq!(handoff.title, FALLBACK_TITLE);

        let url = handoff_url(&origin(), &page, None);
        assert_eq!(Handoff::from_url(&url).unwrap().title, FALLBACK_TITLE);
    }

    #[test]
    fn handoff_parses_back_into_a_request() {
        let page = Url::parse("https://www.youtube.com/watch?v=xyz").unwrap();
        let url = handoff_url(&origin(), &page, Some("  Learning Rust  "));

        let handoff = Handoff::from_url(&url).unwrap();
        assert_eq!(handoff.video, "https://www.youtube.com/watch?v=xyz");
        assert_eq!(handoff.title, "Learning Rust");

        let request = handoff.into_request();
        assert_eq!(
            request.input,
            SummaryInput::Url("https://www.youtube.com/watch?v=xyz".to_string())
        );
        assert_eq!(request.options, SummaryOptions::default());
    }

    #[test]
    fn missing_video_is_rejected() {
        let url = Url::parse("http://localhost:3000/?title=Hello").unwrap();
        assert!(matches!(Handoff::from_url(&url), Err(PortError::InvalidInput(_))));
    }
}
