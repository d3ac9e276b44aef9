use thiserror::Error;

/// Errors that can occur while talking to recipe backends, the text-generation
/// endpoint or the local store
#[derive(Error, Debug)]
pub enum RecetarioError {
    /// Transport failure talking to a backend or provider
    #[error("Failed to fetch: {0}")]
    Fetch(#[from] reqwest::Error),

    /// The RPC backend answered with a non-success status
    #[error("RPC '{procedure}' failed with status {status}: {body}")]
    Rpc {
        procedure: String,
        status: u16,
        body: String,
    },

    /// The backend answered with a body we could not interpret
    #[error("Unexpected response from recipe source: {0}")]
    UnexpectedResponse(String),

    /// The text-generation call itself failed
    #[error("Enrichment failed: {0}")]
    Enrichment(String),

    /// Provider could not be created from configuration
    #[error("Provider error: {0}")]
    Provider(String),

    /// Local key-value store error
    #[error("Storage error: {0}")]
    Storage(String),

    /// JSON (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A new recipe failed form validation
    #[error("Invalid recipe: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// The backend rejected a new recipe
    #[error("Failed to save recipe: {0}")]
    Submission(String),

    /// Operation not available on the configured backend
    #[error("Operation not supported by the '{0}' backend")]
    Unsupported(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RecetarioError>;
