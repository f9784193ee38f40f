//! In-memory storage implementation for testing and development.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use crate::error::{WatchError, WatchResult};
use crate::traits::store::{CompetitorStore, SnapshotStore};
use crate::types::snapshot::{Competitor, NewCompetitor, NewSnapshot, Snapshot};

/// In-memory storage for competitors and snapshots.
///
/// Useful for testing and development. Not suitable for production
/// as data is lost on restart.
pub struct MemoryStore {
    competitors: RwLock<BTreeMap<i64, Competitor>>,
    snapshots: RwLock<HashMap<i64, Vec<Snapshot>>>,
    next_competitor_id: RwLock<i64>,
    next_snapshot_id: RwLock<i64>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self {
            competitors: RwLock::new(BTreeMap::new()),
            snapshots: RwLock::new(HashMap::new()),
            next_competitor_id: RwLock::new(1),
            next_snapshot_id: RwLock::new(1),
        }
    }

    /// Clear all stored data.
    pub fn clear(&self) {
        self.competitors.write().unwrap().clear();
        self.snapshots.write().unwrap().clear();
    }

    /// Get the number of stored competitors.
    pub fn competitor_count(&self) -> usize {
        self.competitors.read().unwrap().len()
    }

    /// Get the total number of stored snapshots.
    pub fn snapshot_count(&self) -> usize {
        self.snapshots.read().unwrap().values().map(Vec::len).sum()
    }

    fn next_id(counter: &RwLock<i64>) -> i64 {
        let mut next = counter.write().unwrap();
        let id = *next;
        *next += 1;
        id
    }
}

#[async_trait]
impl CompetitorStore for MemoryStore {
    async fn add_competitor(&self, competitor: NewCompetitor) -> WatchResult<Competitor> {
        let mut competitors = self.competitors.write().unwrap();
        if competitors.values().any(|c| c.url == competitor.url) {
            return Err(WatchError::Storage(
                format!("competitor already exists: {}", competitor.url).into(),
            ));
        }

        let stored = Competitor {
            id: Self::next_id(&self.next_competitor_id),
            url: competitor.url,
            name: competitor.name,
            created_at: Utc::now(),
        };
        competitors.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get_competitor(&self, id: i64) -> WatchResult<Option<Competitor>> {
        Ok(self.competitors.read().unwrap().get(&id).cloned())
    }

    async fn find_competitor_by_url(&self, url: &str) -> WatchResult<Option<Competitor>> {
        Ok(self
            .competitors
            .read()
            .unwrap()
            .values()
            .find(|c| c.url == url)
            .cloned())
    }

    async fn list_competitors(&self) -> WatchResult<Vec<Competitor>> {
        Ok(self.competitors.read().unwrap().values().cloned().collect())
    }

    async fn delete_competitor(&self, id: i64) -> WatchResult<bool> {
        let removed = self.competitors.write().unwrap().remove(&id).is_some();
        self.snapshots.write().unwrap().remove(&id);
        Ok(removed)
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn save_snapshot(&self, snapshot: NewSnapshot) -> WatchResult<Snapshot> {
        if !self
            .competitors
            .read()
            .unwrap()
            .contains_key(&snapshot.competitor_id)
        {
            return Err(WatchError::CompetitorNotFound {
                id: snapshot.competitor_id,
            });
        }

        let stored = snapshot.into_snapshot(Self::next_id(&self.next_snapshot_id));
        self.snapshots
            .write()
            .unwrap()
            .entry(stored.competitor_id)
            .or_default()
            .push(stored.clone());
        Ok(stored)
    }

    async fn list_snapshots(&self, competitor_id: i64, limit: usize) -> WatchResult<Vec<Snapshot>> {
        Ok(self
            .snapshots
            .read()
            .unwrap()
            .get(&competitor_id)
            .map(|history| history.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn count_snapshots(&self, competitor_id: i64) -> WatchResult<usize> {
        Ok(self
            .snapshots
            .read()
            .unwrap()
            .get(&competitor_id)
            .map_or(0, Vec::len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{change_set::ChangeSet, summary::ChangeSummary};

    fn competitor(url: &str) -> NewCompetitor {
        NewCompetitor::from_input(url).unwrap()
    }

    fn snapshot(competitor_id: i64, text: &str) -> NewSnapshot {
        NewSnapshot::new(
            competitor_id,
            format!("<p>{}</p>", text),
            text,
            ChangeSet::first_observation(text),
            ChangeSummary::no_changes(),
        )
    }

    #[tokio::test]
    async fn test_competitor_crud() {
        let store = MemoryStore::new();

        let acme = store.add_competitor(competitor("acme.io")).await.unwrap();
        let globex = store.add_competitor(competitor("globex.com")).await.unwrap();
        assert_eq!(acme.id, 1);
        assert_eq!(globex.id, 2);

        let found = store
            .find_competitor_by_url("https://acme.io")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found, acme);

        let all = store.list_competitors().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "acme.io");

        assert!(store.delete_competitor(acme.id).await.unwrap());
        assert!(!store.delete_competitor(acme.id).await.unwrap());
        assert!(store.get_competitor(acme.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_url_is_rejected() {
        let store = MemoryStore::new();
        store.add_competitor(competitor("acme.io")).await.unwrap();

        let err = store.add_competitor(competitor("acme.io")).await.unwrap_err();
        assert!(matches!(err, WatchError::Storage(_)));
    }

    #[tokio::test]
    async fn test_snapshots_are_newest_first() {
        let store = MemoryStore::new();
        let acme = store.add_competitor(competitor("acme.io")).await.unwrap();

        assert!(store
            .load_previous_filtered_text(acme.id)
            .await
            .unwrap()
            .is_none());

        for text in ["first", "second", "third"] {
            store.save_snapshot(snapshot(acme.id, text)).await.unwrap();
        }

        let history = store.list_snapshots(acme.id, 2).await.unwrap();
        let texts: Vec<_> = history.iter().map(|s| s.text_content.as_str()).collect();
        assert_eq!(texts, vec!["third", "second"]);

        assert_eq!(
            store.load_previous_filtered_text(acme.id).await.unwrap(),
            Some("third".to_string())
        );
        assert_eq!(store.count_snapshots(acme.id).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_delete_cascades_to_snapshots() {
        let store = MemoryStore::new();
        let acme = store.add_competitor(competitor("acme.io")).await.unwrap();
        store.save_snapshot(snapshot(acme.id, "text")).await.unwrap();

        store.delete_competitor(acme.id).await.unwrap();

        assert_eq!(store.snapshot_count(), 0);
        assert!(store.latest_snapshot(acme.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_snapshot_for_unknown_competitor_is_rejected() {
        let store = MemoryStore::new();
        let err = store.save_snapshot(snapshot(42, "text")).await.unwrap_err();
        assert!(matches!(err, WatchError::CompetitorNotFound { id: 42 }));
    }
}
