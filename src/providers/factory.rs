use crate::config::{AiConfig, ProviderConfig};
use crate::error::{RecetarioError, Result};
use crate::providers::{
    AnthropicProvider, GoogleProvider, LlmProvider, OllamaProvider, OpenAIProvider,
};
use log::info;
use std::time::Duration;

const PROVIDERS: &[&str] = &["google", "openai", "anthropic", "ollama"];

pub struct ProviderFactory;

impl ProviderFactory {
    /// Build the provider called `provider_name` from its configuration
    pub fn create(
        provider_name: &str,
        config: &ProviderConfig,
        timeout: Duration,
    ) -> Result<Box<dyn LlmProvider>> {
        if !config.enabled {
            return Err(RecetarioError::Provider(format!(
                "'{}' is disabled in configuration",
                provider_name
            )));
        }

        let provider: Box<dyn LlmProvider> = match provider_name {
            "google" => Box::new(GoogleProvider::new(config, timeout).map_err(provider_error)?),
            "openai" => Box::new(OpenAIProvider::new(config, timeout).map_err(provider_error)?),
            "anthropic" => {
                Box::new(AnthropicProvider::new(config, timeout).map_err(provider_error)?)
            }
            "ollama" => Box::new(OllamaProvider::new(config, timeout).map_err(provider_error)?),
            other => {
                return Err(RecetarioError::Provider(format!(
                    "unknown provider '{}', expected one of {}",
                    other,
                    PROVIDERS.join(", ")
                )))
            }
        };

        info!("Using {} model {}", provider_name, config.model);
        Ok(provider)
    }

    /// The provider named by `ai.default_provider`
    pub fn get_default_provider(
        config: &AiConfig,
        timeout: Duration,
    ) -> Result<Box<dyn LlmProvider>> {
        let name = &config.default_provider;
        let provider_config = config.providers.get(name).ok_or_else(|| {
            RecetarioError::Provider(format!("no [ai.providers.{}] section in configuration", name))
        })?;

        Self::create(name, provider_config, timeout)
    }

    pub fn available_providers() -> &'static [&'static str] {
        PROVIDERS
    }
}

fn provider_error(e: crate::providers::ProviderError) -> RecetarioError {
    RecetarioError::Provider(e.to_string())
}
