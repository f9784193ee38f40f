use anyhow::{Context, Result};
use competitor_watch::BackendCredentials;
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

const DEFAULT_DATABASE_URL: &str = "sqlite://competitor_watch.db?mode=rwc";

/// CLI configuration loaded from environment variables
#[derive(Debug)]
pub struct Config {
    pub database_url: String,
    /// None when OPENAI_API_KEY is unset: checks still run, summaries
    /// record that classification is unavailable
    pub credentials: Option<BackendCredentials>,
    pub fetch_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let credentials = BackendCredentials::from_optional_key(
            env::var("OPENAI_API_KEY").ok().as_deref(),
        )
        .map(|creds| {
            let creds = match env::var("OPENAI_MODEL") {
                Ok(model) => creds.with_model(model),
                Err(_) => creds,
            };
            match env::var("OPENAI_BASE_URL") {
                Ok(url) => creds.with_base_url(url),
                Err(_) => creds,
            }
        });

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            credentials,
            fetch_timeout: Duration::from_secs(
                env::var("FETCH_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .context("FETCH_TIMEOUT_SECS must be a valid number")?,
            ),
        })
    }
}
