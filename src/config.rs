use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// Top-level application configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    /// Where recipes come from
    #[serde(default)]
    pub source: SourceConfig,
    /// Text-generation providers used for enrichment
    #[serde(default)]
    pub ai: AiConfig,
    /// Local key-value storage
    #[serde(default)]
    pub storage: StorageConfig,
    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

/// Which recipe backend is active
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Public REST recipe API answering `{meals: [...]}`
    #[default]
    Mealdb,
    /// Relational backend reached through named remote procedures
    Rpc,
}

/// Recipe source configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    #[serde(default)]
    pub backend: Backend,
    /// Base URL of the REST recipe API
    #[serde(default = "default_mealdb_url")]
    pub mealdb_url: String,
    /// Area used when a REST listing has no other criteria
    #[serde(default = "default_area")]
    pub area: String,
    /// Base URL of the RPC backend (the `/rest/v1/rpc` path is appended)
    pub rpc_url: Option<String>,
    /// Anonymous API key for the RPC backend
    pub rpc_api_key: Option<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            mealdb_url: default_mealdb_url(),
            area: default_area(),
            rpc_url: None,
            rpc_api_key: None,
        }
    }
}

/// Text-generation configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AiConfig {
    /// Provider used for enrichment
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Map of provider name to provider configuration
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            providers: HashMap::new(),
        }
    }
}

/// Configuration for a specific text-generation provider
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    /// Whether this provider is enabled
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Model identifier (e.g., "gemini-2.0-flash", "gpt-4o-mini")
    pub model: String,
    /// Temperature for generation (0.0-1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// API key for authentication (can also be set via environment variable)
    pub api_key: Option<String>,
    /// Base URL for API endpoint (for custom or proxy endpoints)
    pub base_url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// JSON file holding favorites and pantry
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

// Default value functions
fn default_provider() -> String {
    "google".to_string()
}

fn default_enabled() -> bool {
    true
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_timeout() -> u64 {
    30
}

fn default_mealdb_url() -> String {
    "https://www.themealdb.com/api/json/v1/1".to_string()
}

fn default_area() -> String {
    "Argentinian".to_string()
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("recetario-storage.json")
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with RECETARIO__ prefix
    /// 2. recetario.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: RECETARIO__AI__PROVIDERS__GOOGLE__API_KEY
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }

    /// Provider config for the default provider, if present
    pub fn default_provider_config(&self) -> Option<&ProviderConfig> {
        self.ai.providers.get(&self.ai.default_provider)
    }
}

/// Load configuration from `recetario.toml` and `RECETARIO__*` environment variables
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("recetario").required(false))
        // Use double underscore for nested: RECETARIO__SOURCE__BACKEND
        .add_source(
            Environment::with_prefix("RECETARIO")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}
