use super::chat_completions::JSON_ONLY_INSTRUCTION;
use crate::config::ProviderConfig;
use crate::http_client;
use crate::providers::{LlmProvider, ProviderError};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";

pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: [UserMessage<'a>; 1],
}

#[derive(Serialize)]
struct UserMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

impl AnthropicProvider {
    pub fn new(config: &ProviderConfig, timeout: Duration) -> Result<Self, ProviderError> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
            .ok_or("ANTHROPIC_API_KEY not found in config or environment")?;

        Ok(AnthropicProvider {
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
        AnthropicProvider {
            client: Client::new(),
            api_key,
            base_url,
            model,
            temperature: 0.7,
            max_tokens: 2000,
        }
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn provider_name(&self) -> &str {
        "anthropic"
    }

    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            system: JSON_ONLY_INSTRUCTION,
            messages: [UserMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!("Anthropic response ({}): {}", status, body);

        if !status.is_success() {
            return Err(format!("Anthropic API error {}: {}", status, body).into());
        }

        // Text may be split over several blocks
        let parsed: MessagesResponse = serde_json::from_str(&body)?;
        let text: String = parsed
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .map(|block| block.text)
            .collect();

        if text.is_empty() {
            return Err("No text content in Anthropic response".into());
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn provider(url: String) -> AnthropicProvider {
        AnthropicProvider::with_base_url(
            "fake_api_key".to_string(),
            url,
            "claude-3-5-haiku-latest".to_string(),
        )
    }

    #[tokio::test]
    async fn test_complete_joins_text_blocks() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/messages")
            .match_header("x-api-key", "fake_api_key")
            .match_header("anthropic-version", API_VERSION)
            .match_body(Matcher::PartialJson(json!({
                "system": JSON_ONLY_INSTRUCTION,
                "messages": [{"role": "user", "content": "estimate"}]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "content": [
                        {"type": "text", "text": "[{\"id\":\"9\","},
                        {"type": "text", "text": "\"difficulty\":\"Difícil\"}]"}
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let result = provider(server.url()).complete("estimate").await.unwrap();
        assert_eq!(result, r#"[{"id":"9","difficulty":"Difícil"}]"#);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_overloaded_is_an_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/messages")
            .with_status(529)
            .with_body(r#"{"type": "error", "error": {"type": "overloaded_error"}}"#)
            .create_async()
            .await;

        let error = provider(server.url()).complete("estimate").await.unwrap_err();
        assert!(error.to_string().contains("529"));
    }
}
