//! Classification backend credentials.
//!
//! The API key lives in a `secrecy::SecretString` so it never shows up in
//! logs, debug output or error messages.

use secrecy::{ExposeSecret, SecretString};
use std::fmt;

/// Default chat model used for classification.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo-1106";

/// Default OpenAI-compatible API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Credentials and endpoint for a classification backend.
pub struct BackendCredentials {
    api_key: SecretString,

    /// Model identifier
    pub model: String,

    /// API base URL
    pub base_url: String,
}

impl BackendCredentials {
    /// Create credentials with the default model and base URL.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Build credentials from an optional key.
    ///
    /// Missing or blank keys mean classification is unavailable.
    pub fn from_optional_key(api_key: Option<&str>) -> Option<Self> {
        api_key
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(Self::new)
    }

    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the base URL (for proxies or compatible providers).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Expose the key for an outbound request.
    ///
    /// Only call this when building the request header.
    pub fn expose_api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

impl fmt::Debug for BackendCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendCredentials")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_not_in_debug() {
        let creds = BackendCredentials::new("sk-super-secret-key");
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("sk-super"));
        assert!(debug.contains("[REDACTED]"));
        assert!(debug.contains(DEFAULT_MODEL));
    }

    #[test]
    fn test_expose_works() {
        let creds = BackendCredentials::new("sk-super-secret-key");
        assert_eq!(creds.expose_api_key(), "sk-super-secret-key");
    }

    #[test]
    fn test_blank_key_is_unavailable() {
        assert!(BackendCredentials::from_optional_key(None).is_none());
        assert!(BackendCredentials::from_optional_key(Some("   ")).is_none());
        assert!(BackendCredentials::from_optional_key(Some("sk-x")).is_some());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let creds = BackendCredentials::new("k").with_base_url("https://proxy.local/v1/");
        assert_eq!(creds.base_url, "https://proxy.local/v1");
    }
}
