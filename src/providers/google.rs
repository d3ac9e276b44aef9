use super::chat_completions::JSON_ONLY_INSTRUCTION;
use crate::config::ProviderConfig;
use crate::http_client;
use crate::providers::{LlmProvider, ProviderError};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Gemini `generateContent`, asked to answer in JSON mode
pub struct GoogleProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

impl GoogleProvider {
    pub fn new(config: &ProviderConfig, timeout: Duration) -> Result<Self, ProviderError> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("GOOGLE_API_KEY").ok())
            .ok_or("GOOGLE_API_KEY not found in config or environment")?;

        Ok(GoogleProvider {
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
        GoogleProvider {
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
impl LlmProvider for GoogleProvider {
    fn provider_name(&self) -> &str {
        "google"
    }

    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&json!({
                "systemInstruction": { "parts": [{ "text": JSON_ONLY_INSTRUCTION }] },
                "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
                "generationConfig": {
                    "temperature": self.temperature,
                    "maxOutputTokens": self.max_tokens,
                    "responseMimeType": "application/json"
                }
            }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!("Gemini response ({}): {}", status, body);

        if !status.is_success() {
            return Err(format!("Gemini API error {}: {}", status, body).into());
        }

        let parsed: GenerateResponse = serde_json::from_str(&body)?;
        let candidate = parsed
            .candidates
            .into_iter()
            .next()
            .ok_or("Gemini response has no candidates")?;

        let text: String = candidate
            .content
            .map(|content| content.parts.into_iter().map(|part| part.text).collect::<String>())
            .unwrap_or_default();
        if text.is_empty() {
            return Err(format!(
                "Gemini returned no text (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )
            .into());
        }
        Ok(text)
    }
}
