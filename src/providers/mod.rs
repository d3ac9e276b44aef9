mod anthropic;
mod chat_completions;
mod factory;
mod google;
mod ollama;
mod open_ai;
mod prompt;

pub use anthropic::AnthropicProvider;
pub use factory::ProviderFactory;
pub use google::GoogleProvider;
pub use ollama::OllamaProvider;
pub use open_ai::OpenAIProvider;
pub use prompt::{build_enrichment_prompt, build_pantry_prompt, ENRICHMENT_PROMPT, PANTRY_PROMPT};

use async_trait::async_trait;
use std::error::Error;

pub type ProviderError = Box<dyn Error + Send + Sync>;

/// A text-generation backend taking one prompt and answering free text.
///
/// Answers are expected, not guaranteed, to be JSON; callers sanitize them.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Name used in configuration and logs ("google", "openai", ...)
    fn provider_name(&self) -> &str;

    async fn complete(&self, prompt: &str) -> Result<String, ProviderError>;
}
