//! Competitor Page Change Detection
//!
//! Watches competitor web pages and reports what changed between two
//! observations, categorized into pricing, features, positioning and
//! strategy.
//!
//! # Pipeline
//!
//! 1. **Extract** - strip HTML down to the main textual content
//! 2. **Filter** - drop dynamic noise (timestamps, counters, nav labels)
//! 3. **Diff** - paragraph-level alignment with a significance filter
//! 4. **Classify** - hand the change set to an LLM backend for categorizing
//!
//! Only a fetch failure aborts a check. Classification problems are
//! recorded in the saved summary so the diff is never lost.
//!
//! # Usage
//!
//! ```rust,ignore
//! use competitor_watch::{HttpFetcher, MemoryStore, Monitor};
//! use competitor_watch::testing::MockBackend;
//!
//! let monitor = Monitor::new(HttpFetcher::new()?, MemoryStore::new(), Some(MockBackend::new()));
//!
//! let acme = monitor.add_competitor("acme.io/pricing").await?;
//! let snapshot = monitor.check(acme.id).await?;
//! println!("{}", serde_json::to_string_pretty(&snapshot.summary)?);
//! ```
//!
//! # Modules
//!
//! - [`pipeline`] - The four stages plus the [`Monitor`] that drives them
//! - [`traits`] - Collaborator seams (Fetcher, stores, ClassificationBackend)
//! - [`types`] - Change sets, summaries, snapshots, config
//! - [`stores`] - Storage implementations (MemoryStore, SqliteStore)
//! - [`fetchers`] - HTTP page fetching
//! - [`security`] - Credential handling
//! - [`testing`] - Mock implementations for testing

pub mod ai;
pub mod error;
pub mod fetchers;
pub mod pipeline;
pub mod security;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{ClassifyError, FetchError, WatchError, WatchResult};
pub use traits::{
    backend::{ClassificationBackend, ClassificationRequest},
    fetcher::Fetcher,
    store::{CompetitorStore, SnapshotStore, WatchStore},
};
pub use types::{
    change_set::{ChangeSet, DiffTag, ParagraphOp},
    config::PipelineConfig,
    snapshot::{Competitor, NewCompetitor, NewSnapshot, Snapshot},
    summary::{CategorizedChanges, ChangeSummary},
};

// Re-export pipeline components
pub use pipeline::{
    extract_main_text, filter_noise, generate_diff, generate_diff_with_threshold, is_noise_line,
    normalize_whitespace, parse_summary, ChangeClassifier, CheckOutcome, Monitor, SystemStatus,
};

pub use fetchers::HttpFetcher;
pub use security::BackendCredentials;

// Re-export stores
pub use stores::MemoryStore;

#[cfg(feature = "sqlite")]
pub use stores::SqliteStore;

#[cfg(feature = "openai")]
pub use ai::OpenAiBackend;

// Re-export testing utilities
pub use testing::{MockBackend, MockFetcher};
