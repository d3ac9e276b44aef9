use super::chat_completions::ChatEndpoint;
use crate::config::ProviderConfig;
use crate::http_client;
use crate::providers::{LlmProvider, ProviderError};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Local models served by Ollama through its OpenAI-compatible API
pub struct OllamaProvider {
    client: Client,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OllamaProvider {
    /// No API key is needed
    pub fn new(config: &ProviderConfig, timeout: Duration) -> Result<Self, ProviderError> {
        Ok(OllamaProvider {
            client: http_client(timeout),
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    #[doc(hidden)]
    pub fn with_base_url(base_url: String, model: String) -> Self {
        OllamaProvider {
            client: Client::new(),
            base_url,
            model,
            temperature: 0.7,
            max_tokens: 2000,
        }
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        ChatEndpoint {
            label: "Ollama",
            url: format!("{}/v1/chat/completions", self.base_url),
            bearer: None,
            model: &self.model,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
        .complete(&self.client, prompt)
        .await
    }
}
