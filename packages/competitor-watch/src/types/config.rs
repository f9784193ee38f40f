//! Configuration types for the change-detection pipeline.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default minimum length (in chars) of a changed paragraph.
pub const DEFAULT_SIGNIFICANCE_THRESHOLD: usize = 30;

/// Default per-side character budget sent to the classifier.
pub const DEFAULT_CLASSIFY_MAX_CHARS: usize = 3000;

/// Default character budget for raw HTML stored on a snapshot.
pub const DEFAULT_HTML_MAX_CHARS: usize = 100_000;

/// Default time allowed for a page fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Default time allowed for a classification call.
pub const DEFAULT_CLASSIFY_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for the change-detection pipeline.
///
/// The numeric limits are policy, not correctness: they can be tuned
/// without affecting any pipeline invariant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Changed paragraphs shorter than this are treated as noise.
    ///
    /// Default: 30.
    pub significance_threshold: usize,

    /// Maximum characters of added and of removed text sent to the
    /// classification backend (each side truncated independently).
    ///
    /// Default: 3000.
    pub classify_max_chars: usize,

    /// Maximum characters of raw HTML persisted with a snapshot.
    ///
    /// Default: 100000.
    pub html_max_chars: usize,

    /// Timeout for fetching a competitor page.
    ///
    /// Default: 10 seconds.
    #[serde(with = "duration_secs")]
    pub fetch_timeout: Duration,

    /// Timeout for a single classification backend call.
    ///
    /// Default: 60 seconds.
    #[serde(with = "duration_secs")]
    pub classify_timeout: Duration,

    /// Number of snapshots returned by history queries when no limit is given.
    ///
    /// Default: 5.
    pub history_limit: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            significance_threshold: DEFAULT_SIGNIFICANCE_THRESHOLD,
            classify_max_chars: DEFAULT_CLASSIFY_MAX_CHARS,
            html_max_chars: DEFAULT_HTML_MAX_CHARS,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            classify_timeout: DEFAULT_CLASSIFY_TIMEOUT,
            history_limit: 5,
        }
    }
}

impl PipelineConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the significance threshold.
    pub fn with_significance_threshold(mut self, chars: usize) -> Self {
        self.significance_threshold = chars;
        self
    }

    /// Set the per-side classifier character budget.
    pub fn with_classify_max_chars(mut self, chars: usize) -> Self {
        self.classify_max_chars = chars;
        self
    }

    /// Set the stored HTML character budget.
    pub fn with_html_max_chars(mut self, chars: usize) -> Self {
        self.html_max_chars = chars;
        self
    }

    /// Set the fetch timeout.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Set the classification timeout.
    pub fn with_classify_timeout(mut self, timeout: Duration) -> Self {
        self.classify_timeout = timeout;
        self
    }

    /// Set the default history limit.
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}
