//! Error types for chat-completion calls

use thiserror::Error;

/// Result type for LLM operations
pub type Result<T> = std::result::Result<T, LLMError>;

/// Failure of a chat-completion call
#[derive(Error, Debug)]
pub enum LLMError {
    /// The API answered with a status not covered below
    #[error("Chat completion returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// HTTP 401
    #[error("Invalid API key or authentication failed")]
    AuthenticationFailed,

    /// HTTP 429, including exhausted quota
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// HTTP 400
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// HTTP 404 for the requested model
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// No response could be produced at all
    #[error("No completion available: {0}")]
    Unavailable(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "openai")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected response format: {0}")]
    UnexpectedResponse(String),

    /// Missing or unusable provider settings
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl LLMError {
    /// Map an unsuccessful HTTP status to an error
    pub fn from_status(status: u16, model: &str, body: String) -> Self {
        match status {
            400 => Self::InvalidRequest(body),
            401 => Self::AuthenticationFailed,
            404 => Self::ModelNotFound(model.to_string()),
            429 => Self::RateLimitExceeded(body),
            _ => Self::Status { status, body },
        }
    }
}
