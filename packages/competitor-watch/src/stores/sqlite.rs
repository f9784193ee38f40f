//! SQLite storage implementation.
//!
//! A file-based storage backend using SQLite. Good for:
//! - Local monitoring from the CLI
//! - Single-host deployments
//! - Testing with persistent data

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;

use crate::error::{WatchError, WatchResult};
use crate::traits::store::{CompetitorStore, SnapshotStore};
use crate::types::{
    change_set::ChangeSet,
    snapshot::{Competitor, NewCompetitor, NewSnapshot, Snapshot},
    summary::ChangeSummary,
};

fn storage_err(e: impl std::error::Error + Send + Sync + 'static) -> WatchError {
    WatchError::Storage(Box::new(e))
}

/// SQLite-based competitor and snapshot store.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Create a new SQLite store with the given connection URL.
    ///
    /// # Example URLs
    /// - `sqlite://competitor_watch.db?mode=rwc` - Create if not exists
    /// - `sqlite::memory:` - In-memory database (use [`Self::in_memory`])
    pub async fn new(database_url: &str) -> WatchResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(storage_err)?;

        Self::with_pool(pool).await
    }

    /// Create an in-memory SQLite store (for testing).
    ///
    /// Every connection to `:memory:` is a separate database, so the pool
    /// is held to a single connection.
    pub async fn in_memory() -> WatchResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(storage_err)?;

        Self::with_pool(pool).await
    }

    /// Wrap an existing pool, creating tables if needed.
    pub async fn with_pool(pool: SqlitePool) -> WatchResult<Self> {
        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    /// Run database migrations.
    async fn run_migrations(&self) -> WatchResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS competitors (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                url TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS snapshots (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                competitor_id INTEGER NOT NULL REFERENCES competitors(id) ON DELETE CASCADE,
                timestamp TEXT NOT NULL,
                html_content TEXT NOT NULL,
                text_content TEXT NOT NULL,
                content_hash TEXT NOT NULL,
                diff_json TEXT NOT NULL,
                ai_summary TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_snapshots_competitor ON snapshots(competitor_id, id)",
        )
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

// Row types for sqlx queries
#[derive(Debug, FromRow)]
struct CompetitorRow {
    id: i64,
    url: String,
    name: String,
    created_at: String,
}

impl CompetitorRow {
    fn into_competitor(self) -> WatchResult<Competitor> {
        Ok(Competitor {
            id: self.id,
            url: self.url,
            name: self.name,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

#[derive(Debug, FromRow)]
struct SnapshotRow {
    id: i64,
    competitor_id: i64,
    timestamp: String,
    html_content: String,
    text_content: String,
    content_hash: String,
    diff_json: String,
    ai_summary: String,
}

impl SnapshotRow {
    fn into_snapshot(self) -> WatchResult<Snapshot> {
        let change_set: ChangeSet = serde_json::from_str(&self.diff_json)?;
        let summary: ChangeSummary = serde_json::from_str(&self.ai_summary)?;

        Ok(Snapshot {
            id: self.id,
            competitor_id: self.competitor_id,
            timestamp: parse_timestamp(&self.timestamp)?,
            html_content: self.html_content,
            text_content: self.text_content,
            content_hash: self.content_hash,
            change_set,
            summary,
        })
    }
}

fn parse_timestamp(value: &str) -> WatchResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| WatchError::Storage(format!("Invalid date: {}", e).into()))
}

#[async_trait]
impl CompetitorStore for SqliteStore {
    async fn add_competitor(&self, competitor: NewCompetitor) -> WatchResult<Competitor> {
        let created_at = Utc::now();

        let result = sqlx::query("INSERT INTO competitors (url, name, created_at) VALUES (?, ?, ?)")
            .bind(&competitor.url)
            .bind(&competitor.name)
            .bind(created_at.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;

        Ok(Competitor {
            id: result.last_insert_rowid(),
            url: competitor.url,
            name: competitor.name,
            created_at,
        })
    }

    async fn get_competitor(&self, id: i64) -> WatchResult<Option<Competitor>> {
        sqlx::query_as::<_, CompetitorRow>(
            "SELECT id, url, name, created_at FROM competitors WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?
        .map(CompetitorRow::into_competitor)
        .transpose()
    }

    async fn find_competitor_by_url(&self, url: &str) -> WatchResult<Option<Competitor>> {
        sqlx::query_as::<_, CompetitorRow>(
            "SELECT id, url, name, created_at FROM competitors WHERE url = ?",
        )
        .bind(url)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?
        .map(CompetitorRow::into_competitor)
        .transpose()
    }

    async fn list_competitors(&self) -> WatchResult<Vec<Competitor>> {
        sqlx::query_as::<_, CompetitorRow>(
            "SELECT id, url, name, created_at FROM competitors ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?
        .into_iter()
        .map(CompetitorRow::into_competitor)
        .collect()
    }

    async fn delete_competitor(&self, id: i64) -> WatchResult<bool> {
        let mut tx = self.pool.begin().await.map_err(storage_err)?;

        sqlx::query("DELETE FROM snapshots WHERE competitor_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(storage_err)?;

        let result = sqlx::query("DELETE FROM competitors WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(storage_err)?;

        tx.commit().await.map_err(storage_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> WatchResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(())
    }
}

#[async_trait]
impl SnapshotStore for SqliteStore {
    async fn load_previous_filtered_text(&self, competitor_id: i64) -> WatchResult<Option<String>> {
        let text: Option<(String,)> = sqlx::query_as(
            "SELECT text_content FROM snapshots WHERE competitor_id = ? ORDER BY id DESC LIMIT 1",
        )
        .bind(competitor_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(text.map(|(t,)| t))
    }

    async fn save_snapshot(&self, snapshot: NewSnapshot) -> WatchResult<Snapshot> {
        if self.get_competitor(snapshot.competitor_id).await?.is_none() {
            return Err(WatchError::CompetitorNotFound {
                id: snapshot.competitor_id,
            });
        }

        let diff_json = serde_json::to_string(&snapshot.change_set)?;
        let ai_summary = serde_json::to_string(&snapshot.summary)?;

        let result = sqlx::query(
            r#"
            INSERT INTO snapshots
                (competitor_id, timestamp, html_content, text_content, content_hash, diff_json, ai_summary)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(snapshot.competitor_id)
        .bind(snapshot.timestamp.to_rfc3339())
        .bind(&snapshot.html_content)
        .bind(&snapshot.text_content)
        .bind(&snapshot.content_hash)
        .bind(diff_json)
        .bind(ai_summary)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(snapshot.into_snapshot(result.last_insert_rowid()))
    }

    async fn list_snapshots(&self, competitor_id: i64, limit: usize) -> WatchResult<Vec<Snapshot>> {
        sqlx::query_as::<_, SnapshotRow>(
            r#"
            SELECT id, competitor_id, timestamp, html_content, text_content,
                   content_hash, diff_json, ai_summary
            FROM snapshots
            WHERE competitor_id = ?
            ORDER BY id DESC
            LIMIT ?
            "#,
        )
        .bind(competitor_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?
        .into_iter()
        .map(SnapshotRow::into_snapshot)
        .collect()
    }

    async fn count_snapshots(&self, competitor_id: i64) -> WatchResult<usize> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM snapshots WHERE competitor_id = ?")
                .bind(competitor_id)
                .fetch_one(&self.pool)
                .await
                .map_err(storage_err)?;

        Ok(count as usize)
    }
}
