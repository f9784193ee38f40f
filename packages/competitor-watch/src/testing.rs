//! Testing utilities including mock implementations.
//!
//! These are useful for testing applications that use the watch library
//! without making real network or LLM calls.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::error::{ClassifyError, ClassifyResult, FetchError, FetchResult};
use crate::traits::{
    backend::{ClassificationBackend, ClassificationRequest},
    fetcher::Fetcher,
};

type Responder = dyn Fn(&ClassificationRequest) -> String + Send + Sync;

#[derive(Clone)]
enum MockReply {
    Fixed(String),
    Responder(Arc<Responder>),
    Failure(String),
}

/// A mock classification backend.
///
/// Clones share call history, so a test can hand one clone to the
/// pipeline and assert on the other.
#[derive(Clone)]
pub struct MockBackend {
    reply: MockReply,
    delay: Option<Duration>,
    calls: Arc<RwLock<Vec<ClassificationRequest>>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Create a mock that answers with four empty categories.
    pub fn new() -> Self {
        Self {
            reply: MockReply::Fixed(
                r#"{"pricing": [], "features": [], "positioning": [], "strategy": []}"#.to_string(),
            ),
            delay: None,
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Always answer with this raw text.
    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.reply = MockReply::Fixed(response.into());
        self
    }

    /// Compute the answer from the request.
    pub fn with_responder<F>(mut self, responder: F) -> Self
    where
        F: Fn(&ClassificationRequest) -> String + Send + Sync + 'static,
    {
        self.reply = MockReply::Responder(Arc::new(responder));
        self
    }

    /// Fail every call with a backend error.
    pub fn with_failure(mut self, reason: impl Into<String>) -> Self {
        self.reply = MockReply::Failure(reason.into());
        self
    }

    /// Sleep before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Get all requests made to this mock.
    pub fn calls(&self) -> Vec<ClassificationRequest> {
        self.calls.read().unwrap().clone()
    }

    /// Number of requests made to this mock.
    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }

    /// Clear call history.
    pub fn clear_calls(&self) {
        self.calls.write().unwrap().clear();
    }
}

#[async_trait]
impl ClassificationBackend for MockBackend {
    async fn complete(&self, request: &ClassificationRequest) -> ClassifyResult<String> {
        self.calls.write().unwrap().push(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.reply {
            MockReply::Fixed(text) => Ok(text.clone()),
            MockReply::Responder(responder) => Ok(responder(request)),
            MockReply::Failure(reason) => Err(ClassifyError::Backend(reason.clone().into())),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[derive(Debug, Clone)]
enum MockPage {
    Html(String),
    Status(u16),
    Timeout,
}

/// A mock page fetcher serving canned HTML by URL.
///
/// Unknown URLs answer with HTTP 404. Pages can be replaced between
/// checks to simulate a competitor editing their site.
#[derive(Clone, Default)]
pub struct MockFetcher {
    pages: Arc<RwLock<HashMap<String, MockPage>>>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockFetcher {
    /// Create an empty mock fetcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve this HTML for a URL.
    pub fn with_page(self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.set_page(url, html);
        self
    }

    /// Answer a URL with a non-success status.
    pub fn with_status(self, url: impl Into<String>, status: u16) -> Self {
        self.pages
            .write()
            .unwrap()
            .insert(url.into(), MockPage::Status(status));
        self
    }

    /// Time out on a URL.
    pub fn with_timeout(self, url: impl Into<String>) -> Self {
        self.pages
            .write()
            .unwrap()
            .insert(url.into(), MockPage::Timeout);
        self
    }

    /// Replace the HTML served for a URL.
    pub fn set_page(&self, url: impl Into<String>, html: impl Into<String>) {
        self.pages
            .write()
            .unwrap()
            .insert(url.into(), MockPage::Html(html.into()));
    }

    /// Get all URLs fetched so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<String> {
        self.calls.write().unwrap().push(url.to_string());

        let page = self.pages.read().unwrap().get(url).cloned();
        match page {
            Some(MockPage::Html(html)) => Ok(html),
            Some(MockPage::Status(status)) => Err(FetchError::Status {
                status,
                url: url.to_string(),
            }),
            Some(MockPage::Timeout) => Err(FetchError::Timeout {
                url: url.to_string(),
            }),
            None => Err(FetchError::Status {
                status: 404,
                url: url.to_string(),
            }),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ClassificationRequest {
        ClassificationRequest {
            system: "system".to_string(),
            prompt: "prompt".to_string(),
            added: "added".to_string(),
            removed: String::new(),
        }
    }

    #[tokio::test]
    async fn test_mock_backend_tracks_calls_across_clones() {
        let backend = MockBackend::new().with_response(r#"{"pricing": []}"#);
        let handle = backend.clone();

        let reply = backend.complete(&request()).await.unwrap();

        assert_eq!(reply, r#"{"pricing": []}"#);
        assert_eq!(handle.call_count(), 1);
        assert_eq!(handle.calls()[0].added, "added");
    }

    #[tokio::test]
    async fn test_mock_backend_responder_and_failure() {
        let backend = MockBackend::new().with_responder(|req| format!("echo {}", req.added));
        assert_eq!(backend.complete(&request()).await.unwrap(), "echo added");

        let failing = MockBackend::new().with_failure("quota exceeded");
        let err = failing.complete(&request()).await.unwrap_err();
        assert_eq!(err.to_string(), "backend error: quota exceeded");
    }

    #[tokio::test]
    async fn test_mock_fetcher_pages_and_errors() {
        let fetcher = MockFetcher::new()
            .with_page("https://a.test", "<p>a</p>")
            .with_status("https://b.test", 500)
            .with_timeout("https://c.test");

        assert_eq!(fetcher.fetch("https://a.test").await.unwrap(), "<p>a</p>");
        assert!(matches!(
            fetcher.fetch("https://b.test").await,
            Err(FetchError::Status { status: 500, .. })
        ));
        assert!(matches!(
            fetcher.fetch("https://c.test").await,
            Err(FetchError::Timeout { .. })
        ));
        assert!(matches!(
            fetcher.fetch("https://unknown.test").await,
            Err(FetchError::Status { status: 404, .. })
        ));

        fetcher.set_page("https://a.test", "<p>b</p>");
        assert_eq!(fetcher.fetch("https://a.test").await.unwrap(), "<p>b</p>");
        assert_eq!(fetcher.calls().len(), 5);
    }
}
