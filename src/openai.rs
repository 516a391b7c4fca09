//! Clients for OpenAI-compatible APIs (OpenAI itself, Groq).

use crate::error::{Result, VidbriefError};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Groq serves the OpenAI chat completions API under this base.
pub const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";

/// Build a client with an explicit timeout.
///
/// `api_key` and `api_base` default to the `OPENAI_API_KEY` environment
/// variable and the public OpenAI endpoint.
pub fn create_client(
    api_key: Option<&str>,
    api_base: Option<&str>,
    timeout: Duration,
) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| VidbriefError::Config(format!("Failed to create HTTP client: {}", e)))?;

    let mut config = OpenAIConfig::default();
    if let Some(key) = api_key {
        config = config.with_api_key(key);
    }
    if let Some(base) = api_base {
        config = config.with_api_base(base);
    }

    Ok(Client::with_config(config).with_http_client(http_client))
}
