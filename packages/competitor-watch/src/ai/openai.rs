//! OpenAI implementation of the classification backend.
//!
//! # Example
//!
//! ```rust,ignore
//! use competitor_watch::ai::OpenAiBackend;
//! use competitor_watch::security::BackendCredentials;
//!
//! let backend = OpenAiBackend::new(BackendCredentials::new("sk-..."));
//! let classifier = ChangeClassifier::new(Some(backend));
//! ```

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ClassifyError, ClassifyResult};
use crate::security::BackendCredentials;
use crate::traits::backend::{ClassificationBackend, ClassificationRequest};

/// Chat-completions backend requesting a JSON object reply.
pub struct OpenAiBackend {
    client: Client,
    credentials: BackendCredentials,
    max_tokens: u32,
}

impl OpenAiBackend {
    /// Create a backend from credentials.
    pub fn new(credentials: BackendCredentials) -> Self {
        Self {
            client: Client::new(),
            credentials,
            max_tokens: 500,
        }
    }

    /// Set the completion token limit (default: 500).
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set a custom HTTP client.
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Get the current model name.
    pub fn model(&self) -> &str {
        &self.credentials.model
    }

    fn chat_request(&self, request: &ClassificationRequest) -> ChatRequest {
        ChatRequest {
            model: self.credentials.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: request.system.clone(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: request.prompt.clone(),
                },
            ],
            response_format: ResponseFormat {
                format_type: "json_object".to_string(),
            },
            max_tokens: self.max_tokens,
        }
    }
}

#[async_trait]
impl ClassificationBackend for OpenAiBackend {
    async fn complete(&self, request: &ClassificationRequest) -> ClassifyResult<String> {
        debug!(model = %self.credentials.model, "OpenAI chat completion");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.credentials.base_url))
            .bearer_auth(self.credentials.expose_api_key())
            .json(&self.chat_request(request))
            .send()
            .await
            .map_err(|e| ClassifyError::Backend(Box::new(e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ClassifyError::Backend(
                format!("OpenAI API error ({}): {}", status, error_text).into(),
            ));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| ClassifyError::Backend(Box::new(e)))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ClassifyError::MalformedResponse("no choices in response".to_string()))
    }

    fn name(&self) -> &str {
        "openai"
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    response_format: ResponseFormat,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}
