use super::chat_completions::ChatEndpoint;
use crate::config::ProviderConfig;
use crate::http_client;
use crate::providers::{LlmProvider, ProviderError};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";

pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAIProvider {
    pub fn new(config: &ProviderConfig, timeout: Duration) -> Result<Self, ProviderError> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .ok_or("OPENAI_API_KEY not found in config or environment")?;

        Ok(OpenAIProvider {
            client: http_client(timeout),
            api_key,
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
    pub fn with_base_url(api_key: String, base_url: String, model: String) -> Self {
        OpenAIProvider {
            client: Client::new(),
            api_key,
            base_url,
            model,
            temperature: 0.7,
            max_tokens: 2000,
        }
    }

    fn endpoint(&self) -> ChatEndpoint<'_> {
        ChatEndpoint {
            label: "OpenAI",
            url: format!("{}/v1/chat/completions", self.base_url),
            bearer: Some(&self.api_key),
            model: &self.model,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAIProvider {
    fn provider_name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        self.endpoint().complete(&self.client, prompt).await
    }
}
