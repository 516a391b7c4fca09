//! Local Ollama server via its generate endpoint.

use super::LlmClient;
use crate::config::LlmSettings;
use crate::error::{Result, VidbriefError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

/// Local models are slower than hosted APIs; the configured timeout is
/// multiplied by this factor.
const LOCAL_TIMEOUT_FACTOR: u64 = 5;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

pub struct OllamaClient {
    http: reqwest::Client,
    url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OllamaClient {
    pub fn new(settings: &LlmSettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds * LOCAL_TIMEOUT_FACTOR))
            .build()
            .map_err(|e| VidbriefError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            url: settings.ollama_url.clone(),
            model: settings.ollama_model.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        })
    }

    fn full_prompt(prompt: &str, system_prompt: &str) -> String {
        if system_prompt.is_empty() {
            prompt.to_string()
        } else {
            format!("{}\n\n{}", system_prompt, prompt)
        }
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    #[instrument(skip_all, fields(model = %self.model))]
    async fn generate(&self, prompt: &str, system_prompt: &str) -> Result<String> {
        let body = GenerateRequest {
            model: &self.model,
            prompt: Self::full_prompt(prompt, system_prompt),
            stream: false,
            options: GenerateOptions {
                temperature: self.temperature,
                num_predict: self.max_tokens,
            },
        };

        let response = self.http.post(&self.url).json(&body).send().await.map_err(|e| {
            VidbriefError::Llm(format!("Ollama request to {} failed: {}", self.url, e))
        })?;

        let status = response.status();
        debug!("Ollama response status: {}", status);
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(VidbriefError::Llm(format!("Ollama error: {} - {}", status, detail)));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| VidbriefError::Llm(format!("Unexpected Ollama response: {}", e)))?;
        Ok(parsed.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_is_prepended() {
        assert_eq!(OllamaClient::full_prompt("Summarize", ""), "Summarize");
        assert_eq!(
            OllamaClient::full_prompt("Summarize", "Be brief"),
            "Be brief\n\nSummarize"
        );
    }

    #[test]
    fn test_request_body_shape() {
        let body = GenerateRequest {
            model: "llama3.1:8b",
            prompt: "hi".to_string(),
            stream: false,
            options: GenerateOptions {
                temperature: 0.5,
                num_predict: 100,
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["stream"], false);
        assert_eq!(json["options"]["num_predict"], 100);
        assert_eq!(json["model"], "llama3.1:8b");
    }
}
