//! OpenAI-compatible chat completions (OpenAI, Groq).

use super::{LlmClient, LlmProvider};
use crate::config::LlmSettings;
use crate::error::{Result, VidbriefError};
use crate::openai::{create_client, GROQ_API_BASE};
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

/// Chat completion client for hosted providers.
pub struct ChatCompletionClient {
    client: Client<OpenAIConfig>,
    provider: LlmProvider,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl ChatCompletionClient {
    pub fn new(settings: &LlmSettings, api_key: &str) -> Result<Self> {
        let api_base = match settings.provider {
            LlmProvider::Groq => Some(GROQ_API_BASE),
            _ => None,
        };

        Ok(Self {
            client: create_client(
                Some(api_key),
                api_base,
                Duration::from_secs(settings.timeout_seconds),
            )?,
            provider: settings.provider,
            model: settings.model().to_string(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        })
    }

    fn build_messages(prompt: &str, system_prompt: &str) -> Result<Vec<ChatCompletionRequestMessage>> {
        let mut messages: Vec<ChatCompletionRequestMessage> = Vec::with_capacity(2);

        if !system_prompt.is_empty() {
            messages.push(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(system_prompt)
                    .build()
                    .map_err(|e| VidbriefError::Llm(e.to_string()))?
                    .into(),
            );
        }

        messages.push(
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(|e| VidbriefError::Llm(e.to_string()))?
                .into(),
        );

        Ok(messages)
    }
}

#[async_trait]
impl LlmClient for ChatCompletionClient {
    #[instrument(skip_all, fields(provider = %self.provider, model = %self.model))]
    async fn generate(&self, prompt: &str, system_prompt: &str) -> Result<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(Self::build_messages(prompt, system_prompt)?)
            .temperature(self.temperature)
            .max_completion_tokens(self.max_tokens)
            .top_p(1.0)
            .build()
            .map_err(|e| VidbriefError::Llm(e.to_string()))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            VidbriefError::Llm(format!("{} API request failed: {}", self.provider, e))
        })?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| VidbriefError::Llm(format!("Empty response from {}", self.provider)))?;

        debug!("Received {} chars", content.len());
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_message_only_when_present() {
        let messages = ChatCompletionClient::build_messages("Summarize", "").unwrap();
        assert_eq!(messages.len(), 1);
        assert!(matches!(messages[0], ChatCompletionRequestMessage::User(_)));

        let messages = ChatCompletionClient::build_messages("Summarize", "Be brief").unwrap();
        assert_eq!(messages.len(), 2);
        assert!(matches!(messages[0], ChatCompletionRequestMessage::System(_)));
    }
}
