//! Storage traits for competitors and snapshots.
//!
//! The storage layer is split into focused traits:
//! - `CompetitorStore`: registered competitor pages
//! - `SnapshotStore`: append-only observations of those pages
//! - `WatchStore`: composite trait combining both
//!
//! The pipeline only needs the previous filtered text and a way to append
//! a snapshot; it never depends on a relational schema.

use async_trait::async_trait;

use crate::error::WatchResult;
use crate::types::snapshot::{Competitor, NewCompetitor, NewSnapshot, Snapshot};

/// Registry of monitored competitor pages.
#[async_trait]
pub trait CompetitorStore: Send + Sync {
    /// Insert a competitor. URLs are unique.
    async fn add_competitor(&self, competitor: NewCompetitor) -> WatchResult<Competitor>;

    /// Get a competitor by id.
    async fn get_competitor(&self, id: i64) -> WatchResult<Option<Competitor>>;

    /// Get a competitor by its normalized URL.
    async fn find_competitor_by_url(&self, url: &str) -> WatchResult<Option<Competitor>>;

    /// All competitors, oldest first.
    async fn list_competitors(&self) -> WatchResult<Vec<Competitor>>;

    /// Delete a competitor and all of its snapshots.
    ///
    /// Returns false when the competitor did not exist.
    async fn delete_competitor(&self, id: i64) -> WatchResult<bool>;

    /// Check that the store is reachable.
    async fn ping(&self) -> WatchResult<()> {
        Ok(())
    }
}

/// Append-only snapshot history.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Filtered text of the most recent snapshot, if any.
    async fn load_previous_filtered_text(&self, competitor_id: i64) -> WatchResult<Option<String>> {
        Ok(self
            .latest_snapshot(competitor_id)
            .await?
            .map(|snapshot| snapshot.text_content))
    }

    /// Append a snapshot and return it with its assigned id.
    async fn save_snapshot(&self, snapshot: NewSnapshot) -> WatchResult<Snapshot>;

    /// Most recent snapshots for a competitor, newest first.
    async fn list_snapshots(&self, competitor_id: i64, limit: usize) -> WatchResult<Vec<Snapshot>>;

    /// The most recent snapshot for a competitor.
    async fn latest_snapshot(&self, competitor_id: i64) -> WatchResult<Option<Snapshot>> {
        Ok(self
            .list_snapshots(competitor_id, 1)
            .await?
            .into_iter()
            .next())
    }

    /// Number of snapshots stored for a competitor.
    async fn count_snapshots(&self, competitor_id: i64) -> WatchResult<usize>;
}

/// Composite storage trait used by the monitor.
pub trait WatchStore: CompetitorStore + SnapshotStore {}

// Blanket implementation: anything implementing both traits is a WatchStore
impl<T: CompetitorStore + SnapshotStore> WatchStore for T {}
