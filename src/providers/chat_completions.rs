use crate::providers::ProviderError;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Keeps chat models from wrapping their JSON in prose
pub(crate) const JSON_ONLY_INSTRUCTION: &str =
    "Respondé únicamente con JSON válido, sin texto antes ni después.";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// Settings of one OpenAI-compatible `/v1/chat/completions` endpoint
pub(crate) struct ChatEndpoint<'a> {
    pub label: &'a str,
    pub url: String,
    pub bearer: Option<&'a str>,
    pub model: &'a str,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl ChatEndpoint<'_> {
    /// Send `prompt` as the user turn and return the first choice's text
    pub async fn complete(&self, client: &Client, prompt: &str) -> Result<String, ProviderError> {
        let body = ChatRequest {
            model: self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: JSON_ONLY_INSTRUCTION,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let mut request = client.post(&self.url).json(&body);
        if let Some(token) = self.bearer {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        debug!("{} response ({}): {}", self.label, status, text);

        if !status.is_success() {
            return Err(format!("{} API error {}: {}", self.label, status, text).into());
        }

        let parsed: ChatResponse = serde_json::from_str(&text)?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| format!("No completion text in {} response", self.label).into())
    }
}
