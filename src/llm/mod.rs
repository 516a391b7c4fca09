//! LLM backends for transcript analysis.
//!
//! Every backend takes a user prompt plus an optional system prompt and
//! returns the generated text.

mod chat;
mod ollama;

pub use crate::config::LlmProvider;
pub use chat::ChatCompletionClient;
pub use ollama::OllamaClient;

use crate::config::LlmSettings;
use crate::error::{Result, VidbriefError};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Trait for text generation services.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate a completion. An empty `system_prompt` sends no system message.
    async fn generate(&self, prompt: &str, system_prompt: &str) -> Result<String>;
}

/// Build the client for the configured provider.
///
/// Hosted providers need an API key, either in the settings or in the
/// provider's environment variable.
pub fn create_llm_client(settings: &LlmSettings) -> Result<Arc<dyn LlmClient>> {
    info!(provider = %settings.provider, model = settings.model(), "Using LLM provider");

    match settings.provider {
        LlmProvider::Ollama => Ok(Arc::new(OllamaClient::new(settings)?)),
        LlmProvider::Groq | LlmProvider::OpenAI => {
            let api_key = settings.resolve_api_key().ok_or_else(|| {
                VidbriefError::Config(missing_key_message(settings.provider))
            })?;
            Ok(Arc::new(ChatCompletionClient::new(settings, &api_key)?))
        }
    }
}

fn missing_key_message(provider: LlmProvider) -> String {
    let var = provider.api_key_env().unwrap_or("API_KEY");
    match provider {
        LlmProvider::Groq => format!(
            "API key required for Groq. Set {} or llm.api_key (free key at https://console.groq.com)",
            var
        ),
        _ => format!("API key required for {}. Set {} or llm.api_key", provider, var),
    }
}
