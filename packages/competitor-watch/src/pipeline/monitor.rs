//! Monitor - runs full checks against registered competitors.
//!
//! A check is fetch, extract, filter, diff against the previous snapshot,
//! classify and persist. Only a fetch failure (or a storage failure)
//! aborts it; classification problems end up in the saved summary.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{FetchError, WatchError, WatchResult};
use crate::pipeline::classify::ChangeClassifier;
use crate::pipeline::{diff, extract, noise, truncate_chars};
use crate::traits::{backend::ClassificationBackend, fetcher::Fetcher, store::WatchStore};
use crate::types::{
    config::PipelineConfig,
    snapshot::{Competitor, NewCompetitor, NewSnapshot, Snapshot},
};

/// Health of the monitor's collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemStatus {
    /// Always "ok" while the process is running
    pub backend: String,

    /// "connected" or "disconnected"
    pub database: String,

    /// "connected" or "disconnected (no key)"
    pub llm: String,
}

/// Result of checking one competitor during [`Monitor::check_all`].
#[derive(Debug)]
pub struct CheckOutcome {
    pub competitor: Competitor,
    pub result: WatchResult<Snapshot>,
}

/// Drives the change-detection pipeline for stored competitors.
pub struct Monitor<F, S, B> {
    fetcher: F,
    store: S,
    classifier: ChangeClassifier<B>,
    config: PipelineConfig,
}

impl<F, S, B> Monitor<F, S, B>
where
    F: Fetcher,
    S: WatchStore,
    B: ClassificationBackend,
{
    /// Create a monitor. `backend = None` runs in degraded mode: diffs are
    /// still computed and saved, summaries carry an `error` key.
    pub fn new(fetcher: F, store: S, backend: Option<B>) -> Self {
        Self {
            fetcher,
            store,
            classifier: ChangeClassifier::new(backend),
            config: PipelineConfig::default(),
        }
    }

    /// Replace the pipeline config.
    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.classifier = self.classifier.with_config(&config);
        self.config = config;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Register a competitor page. Returns the existing record when the
    /// normalized URL is already registered.
    pub async fn add_competitor(&self, input: &str) -> WatchResult<Competitor> {
        let competitor = NewCompetitor::from_input(input)?;

        if let Some(existing) = self.store.find_competitor_by_url(&competitor.url).await? {
            debug!(url = %existing.url, id = existing.id, "Competitor already registered");
            return Ok(existing);
        }

        let stored = self.store.add_competitor(competitor).await?;
        info!(id = stored.id, url = %stored.url, "Competitor added");
        Ok(stored)
    }

    /// All registered competitors.
    pub async fn list_competitors(&self) -> WatchResult<Vec<Competitor>> {
        self.store.list_competitors().await
    }

    /// Delete a competitor and its history.
    pub async fn remove_competitor(&self, id: i64) -> WatchResult<()> {
        if !self.store.delete_competitor(id).await? {
            return Err(WatchError::CompetitorNotFound { id });
        }
        info!(id, "Competitor removed");
        Ok(())
    }

    /// Run one check and persist the resulting snapshot.
    pub async fn check(&self, competitor_id: i64) -> WatchResult<Snapshot> {
        let competitor = self.competitor(competitor_id).await?;
        self.check_competitor(&competitor).await
    }

    /// Check every competitor in turn. A failing competitor does not stop
    /// the rest.
    pub async fn check_all(&self) -> WatchResult<Vec<CheckOutcome>> {
        let competitors = self.store.list_competitors().await?;
        let mut outcomes = Vec::with_capacity(competitors.len());

        for competitor in competitors {
            let result = self.check_competitor(&competitor).await;
            if let Err(e) = &result {
                warn!(id = competitor.id, error = %e, "Check failed");
            }
            outcomes.push(CheckOutcome { competitor, result });
        }

        Ok(outcomes)
    }

    async fn check_competitor(&self, competitor: &Competitor) -> WatchResult<Snapshot> {
        info!(id = competitor.id, url = %competitor.url, "Checking competitor");

        let html = tokio::time::timeout(self.config.fetch_timeout, self.fetcher.fetch(&competitor.url))
            .await
            .map_err(|_| FetchError::Timeout {
                url: competitor.url.clone(),
            })??;

        let text = noise::filter_noise(&extract::extract_main_text(&html));
        let previous = self
            .store
            .load_previous_filtered_text(competitor.id)
            .await?
            .unwrap_or_default();

        let changes =
            diff::generate_diff_with_threshold(&previous, &text, self.config.significance_threshold);
        debug!(
            id = competitor.id,
            added = changes.lines_added_count,
            removed = changes.lines_removed_count,
            "Diff computed"
        );

        let summary = self.classifier.classify_changes(&changes).await;

        let snapshot = NewSnapshot::new(
            competitor.id,
            truncate_chars(&html, self.config.html_max_chars),
            text,
            changes,
            summary,
        );
        let saved = self.store.save_snapshot(snapshot).await?;

        info!(
            id = competitor.id,
            snapshot_id = saved.id,
            added = saved.change_set.lines_added_count,
            removed = saved.change_set.lines_removed_count,
            "Snapshot saved"
        );
        Ok(saved)
    }

    /// Most recent snapshots, newest first. `None` uses the configured
    /// default limit.
    pub async fn history(&self, competitor_id: i64, limit: Option<usize>) -> WatchResult<Vec<Snapshot>> {
        self.competitor(competitor_id).await?;
        let limit = limit.unwrap_or(self.config.history_limit);
        self.store.list_snapshots(competitor_id, limit).await
    }

    /// Report store reachability and classifier availability.
    pub async fn status(&self) -> SystemStatus {
        let database = match self.store.ping().await {
            Ok(()) => "connected",
            Err(e) => {
                warn!(error = %e, "Store ping failed");
                "disconnected"
            }
        };

        let llm = if self.classifier.is_configured() {
            "connected"
        } else {
            "disconnected (no key)"
        };

        SystemStatus {
            backend: "ok".to_string(),
            database: database.to_string(),
            llm: llm.to_string(),
        }
    }

    async fn competitor(&self, id: i64) -> WatchResult<Competitor> {
        self.store
            .get_competitor(id)
            .await?
            .ok_or(WatchError::CompetitorNotFound { id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::MemoryStore;
    use crate::testing::{MockBackend, MockFetcher};

    const URL: &str = "https://acme.io";

    fn monitor(fetcher: MockFetcher, backend: Option<MockBackend>) -> Monitor<MockFetcher, MemoryStore, MockBackend> {
        Monitor::new(fetcher, MemoryStore::new(), backend)
    }

    #[tokio::test]
    async fn test_add_competitor_is_idempotent() {
        let monitor = monitor(MockFetcher::new(), None);

        let first = monitor.add_competitor("acme.io").await.unwrap();
        let second = monitor.add_competitor("https://acme.io").await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(monitor.list_competitors().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_competitor() {
        let monitor = monitor(MockFetcher::new(), None);

        assert!(matches!(
            monitor.check(99).await,
            Err(WatchError::CompetitorNotFound { id: 99 })
        ));
        assert!(matches!(
            monitor.history(99, None).await,
            Err(WatchError::CompetitorNotFound { id: 99 })
        ));
        assert!(matches!(
            monitor.remove_competitor(99).await,
            Err(WatchError::CompetitorNotFound { id: 99 })
        ));
    }

    #[tokio::test]
    async fn test_stored_html_is_truncated() {
        let html = format!("<main><p>{}</p></main>", "x".repeat(200));
        let monitor = monitor(MockFetcher::new().with_page(URL, html), None)
            .with_config(PipelineConfig::new().with_html_max_chars(50));
        let acme = monitor.add_competitor(URL).await.unwrap();

        let snapshot = monitor.check(acme.id).await.unwrap();

        assert_eq!(snapshot.html_content.chars().count(), 50);
        assert_eq!(snapshot.text_content, "x".repeat(200));
    }

    #[tokio::test]
    async fn test_history_default_limit_and_removal() {
        let fetcher = MockFetcher::new().with_page(URL, "<main><p>Same page</p></main>");
        let monitor = monitor(fetcher, None).with_config(PipelineConfig::new().with_history_limit(2));
        let acme = monitor.add_competitor(URL).await.unwrap();

        for _ in 0..3 {
            monitor.check(acme.id).await.unwrap();
        }

        let history = monitor.history(acme.id, None).await.unwrap();
        assert_eq!(history.len(), 2);
        assert!(history[0].id > history[1].id);
        assert_eq!(monitor.history(acme.id, Some(10)).await.unwrap().len(), 3);

        monitor.remove_competitor(acme.id).await.unwrap();
        assert_eq!(monitor.store().snapshot_count(), 0);
    }

    #[tokio::test]
    async fn test_check_all_continues_past_failures() {
        let fetcher = MockFetcher::new()
            .with_page("https://good.io", "<main><p>Good page</p></main>")
            .with_status("https://bad.io", 503);
        let monitor = monitor(fetcher, None);
        monitor.add_competitor("bad.io").await.unwrap();
        monitor.add_competitor("good.io").await.unwrap();

        let outcomes = monitor.check_all().await.unwrap();

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[0].result.is_err());
        assert!(outcomes[1].result.is_ok());
        assert_eq!(monitor.store().snapshot_count(), 1);
    }

    #[tokio::test]
    async fn test_status() {
        let unconfigured = monitor(MockFetcher::new(), None);
        assert_eq!(
            unconfigured.status().await,
            SystemStatus {
                backend: "ok".to_string(),
                database: "connected".to_string(),
                llm: "disconnected (no key)".to_string(),
            }
        );

        let configured = monitor(MockFetcher::new(), Some(MockBackend::new()));
        assert_eq!(configured.status().await.llm, "connected");
    }
}
