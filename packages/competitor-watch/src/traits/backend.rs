//! Classification backend trait.
//!
//! The backend is an opaque collaborator: it receives the change text plus
//! instructions and answers with JSON text. Prompting, truncation and
//! response handling live in [`crate::pipeline::classify`].

use async_trait::async_trait;

use crate::error::ClassifyResult;

/// A single classification request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationRequest {
    /// System role text
    pub system: String,

    /// Full user instructions, with the change text embedded
    pub prompt: String,

    /// Added text (already truncated)
    pub added: String,

    /// Removed text (already truncated)
    pub removed: String,
}

/// Backend that turns an added/removed text pair into categorized JSON.
///
/// Implementations wrap a specific LLM provider and must answer with a
/// JSON object carrying `pricing`, `features`, `positioning` and
/// `strategy` lists.
#[async_trait]
pub trait ClassificationBackend: Send + Sync {
    /// Submit the request and return the raw JSON text.
    async fn complete(&self, request: &ClassificationRequest) -> ClassifyResult<String>;

    /// Short name for logs and status output.
    fn name(&self) -> &str {
        "classification-backend"
    }
}

#[async_trait]
impl<B: ClassificationBackend + ?Sized> ClassificationBackend for Box<B> {
    async fn complete(&self, request: &ClassificationRequest) -> ClassifyResult<String> {
        (**self).complete(request).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
