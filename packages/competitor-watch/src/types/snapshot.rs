//! Competitor and snapshot records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use url::Url;

use crate::error::{WatchError, WatchResult};
use crate::types::{change_set::ChangeSet, summary::ChangeSummary};

/// A monitored competitor page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Competitor {
    pub id: i64,

    /// Normalized page URL (unique)
    pub url: String,

    /// Display name, derived from the host
    pub name: String,

    pub created_at: DateTime<Utc>,
}

/// A competitor that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCompetitor {
    pub url: String,
    pub name: String,
}

impl NewCompetitor {
    /// Normalize user input into a competitor.
    ///
    /// Adds `https://` when no scheme is given and names the competitor
    /// after the URL host.
    pub fn from_input(input: &str) -> WatchResult<Self> {
        let trimmed = input.trim();
        let candidate = if trimmed.starts_with("http") {
            trimmed.to_string()
        } else {
            format!("https://{}", trimmed)
        };

        let parsed = Url::parse(&candidate).map_err(|_| WatchError::InvalidUrl {
            url: input.to_string(),
        })?;

        let name = parsed
            .host_str()
            .map(|h| h.to_string())
            .ok_or_else(|| WatchError::InvalidUrl {
                url: input.to_string(),
            })?;

        Ok(Self {
            url: candidate,
            name,
        })
    }
}

/// One persisted observation of a competitor page.
///
/// Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: i64,
    pub competitor_id: i64,
    pub timestamp: DateTime<Utc>,

    /// Raw HTML, truncated
    pub html_content: String,

    /// Filtered text, the input to the next diff
    pub text_content: String,

    /// SHA-256 of `text_content`
    pub content_hash: String,

    pub change_set: ChangeSet,
    pub summary: ChangeSummary,
}

/// A snapshot ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSnapshot {
    pub competitor_id: i64,
    pub timestamp: DateTime<Utc>,
    pub html_content: String,
    pub text_content: String,
    pub content_hash: String,
    pub change_set: ChangeSet,
    pub summary: ChangeSummary,
}

impl NewSnapshot {
    pub fn new(
        competitor_id: i64,
        html_content: impl Into<String>,
        text_content: impl Into<String>,
        change_set: ChangeSet,
        summary: ChangeSummary,
    ) -> Self {
        let text_content = text_content.into();
        Self {
            competitor_id,
            timestamp: Utc::now(),
            html_content: html_content.into(),
            content_hash: content_hash(&text_content),
            text_content,
            change_set,
            summary,
        }
    }

    /// Attach the id assigned by the store.
    pub fn into_snapshot(self, id: i64) -> Snapshot {
        Snapshot {
            id,
            competitor_id: self.competitor_id,
            timestamp: self.timestamp,
            html_content: self.html_content,
            text_content: self.text_content,
            content_hash: self.content_hash,
            change_set: self.change_set,
            summary: self.summary,
        }
    }
}

/// Hex SHA-256 of filtered page text.
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_input_adds_scheme_and_name() {
        let competitor = NewCompetitor::from_input("acme.io/pricing").unwrap();
        assert_eq!(competitor.url, "https://acme.io/pricing");
        assert_eq!(competitor.name, "acme.io");
    }

    #[test]
    fn test_from_input_keeps_existing_scheme() {
        let competitor = NewCompetitor::from_input("http://www.example.com").unwrap();
        assert_eq!(competitor.url, "http://www.example.com");
        assert_eq!(competitor.name, "www.example.com");
    }

    #[test]
    fn test_from_input_rejects_garbage() {
        assert!(matches!(
            NewCompetitor::from_input("https://"),
            Err(WatchError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_new_snapshot_hashes_text() {
        let snapshot = NewSnapshot::new(
            1,
            "<p>hi</p>",
            "hi",
            ChangeSet::first_observation("hi"),
            ChangeSummary::no_changes(),
        );
        assert_eq!(snapshot.content_hash, content_hash("hi"));
        assert_eq!(snapshot.content_hash.len(), 64);

        let stored = snapshot.into_snapshot(7);
        assert_eq!(stored.id, 7);
        assert_eq!(stored.competitor_id, 1);
    }
}
