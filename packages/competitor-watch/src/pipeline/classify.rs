//! Change classification - turns a change set into a categorized summary.
//!
//! The classifier owns prompt construction, truncation and response
//! handling. The backend call itself goes through [`ClassificationBackend`].
//! Every failure is folded into an `error` summary; nothing is returned as
//! `Err` from this stage.

use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{ClassifyError, ClassifyResult};
use crate::pipeline::prompts::{format_classify_prompt, CLASSIFY_SYSTEM_PROMPT};
use crate::pipeline::truncate_chars;
use crate::traits::backend::{ClassificationBackend, ClassificationRequest};
use crate::types::{
    change_set::ChangeSet,
    config::PipelineConfig,
    summary::{CategorizedChanges, ChangeSummary, CATEGORY_KEYS},
};

/// Classifies change sets with an optional backend.
///
/// `None` means no credential is configured: every classification then
/// returns the unavailable-state summary without any outbound call.
pub struct ChangeClassifier<B> {
    backend: Option<B>,
    max_chars: usize,
    timeout: Duration,
}

impl<B: ClassificationBackend> ChangeClassifier<B> {
    /// Create a classifier with default limits.
    pub fn new(backend: Option<B>) -> Self {
        let config = PipelineConfig::default();
        Self {
            backend,
            max_chars: config.classify_max_chars,
            timeout: config.classify_timeout,
        }
    }

    /// Take truncation and timeout limits from a pipeline config.
    pub fn with_config(mut self, config: &PipelineConfig) -> Self {
        self.max_chars = config.classify_max_chars;
        self.timeout = config.classify_timeout;
        self
    }

    /// Whether a backend (credential) is available.
    pub fn is_configured(&self) -> bool {
        self.backend.is_some()
    }

    /// Access the backend, if configured.
    pub fn backend(&self) -> Option<&B> {
        self.backend.as_ref()
    }

    /// Classify a change set.
    pub async fn classify_changes(&self, changes: &ChangeSet) -> ChangeSummary {
        self.classify(&changes.added, &changes.removed).await
    }

    /// Classify an added/removed text pair.
    pub async fn classify(&self, added: &str, removed: &str) -> ChangeSummary {
        let Some(backend) = &self.backend else {
            debug!("Classification skipped, no backend configured");
            return ChangeSummary::error(ClassifyError::NotConfigured.to_string());
        };

        if added.is_empty() && removed.is_empty() {
            return ChangeSummary::no_changes();
        }

        match self.try_classify(backend, added, removed).await {
            Ok(summary) => {
                info!(backend = backend.name(), "Change set classified");
                summary
            }
            Err(e) => {
                warn!(backend = backend.name(), error = %e, "Classification failed");
                ChangeSummary::error(format!("Error generating summary: {}", e))
            }
        }
    }

    async fn try_classify(
        &self,
        backend: &B,
        added: &str,
        removed: &str,
    ) -> ClassifyResult<ChangeSummary> {
        let request = build_request(added, removed, self.max_chars);
        debug!(
            added_chars = request.added.len(),
            removed_chars = request.removed.len(),
            "Submitting change set for classification"
        );

        let response = tokio::time::timeout(self.timeout, backend.complete(&request))
            .await
            .map_err(|_| ClassifyError::Timeout {
                secs: self.timeout.as_secs(),
            })??;

        parse_summary(&response)
    }
}

/// Build the backend request, truncating each side independently.
pub fn build_request(added: &str, removed: &str, max_chars: usize) -> ClassificationRequest {
    let added = truncate_chars(added, max_chars);
    let removed = truncate_chars(removed, max_chars);

    ClassificationRequest {
        system: CLASSIFY_SYSTEM_PROMPT.to_string(),
        prompt: format_classify_prompt(added, removed),
        added: added.to_string(),
        removed: removed.to_string(),
    }
}

/// Parse a backend response into a summary.
///
/// Tolerates a markdown code fence around the JSON. Any category key makes
/// the reply categorized, even next to a `message` key; otherwise an
/// `error` or `message` key is taken as is. Anything else is malformed.
pub fn parse_summary(response: &str) -> ClassifyResult<ChangeSummary> {
    let json_str = response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let value: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| ClassifyError::MalformedResponse(e.to_string()))?;

    let Some(object) = value.as_object() else {
        return Err(ClassifyError::MalformedResponse(
            "expected a JSON object".to_string(),
        ));
    };

    let malformed = |e: serde_json::Error| ClassifyError::MalformedResponse(e.to_string());

    if CATEGORY_KEYS.iter().any(|key| object.contains_key(*key)) {
        let changes: CategorizedChanges = serde_json::from_value(value).map_err(malformed)?;
        return Ok(ChangeSummary::Categorized(changes));
    }

    let text_field = |key: &str| object.get(key).and_then(|v| v.as_str()).map(str::to_string);
    if let Some(error) = text_field("error") {
        return Ok(ChangeSummary::error(error));
    }
    if let Some(message) = text_field("message") {
        return Ok(ChangeSummary::message(message));
    }

    Err(ClassifyError::MalformedResponse(
        "no summary keys in response".to_string(),
    ))
}
