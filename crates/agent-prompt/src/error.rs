//! Error types for prompt operations

use thiserror::Error;

/// Result type for prompt operations
pub type Result<T> = std::result::Result<T, PromptError>;

/// Errors that can occur during prompt operations
#[derive(Error, Debug)]
pub enum PromptError {
    /// Template source does not parse
    #[error("Failed to parse template '{name}': {detail}")]
    TemplateParseFailed { name: String, detail: String },

    /// Rendering failed, usually an input the template needs is missing
    #[error("Failed to render template '{name}': {detail}")]
    RenderError { name: String, detail: String },

    /// Template not registered in registry
    #[error("Template '{0}' not registered")]
    TemplateNotRegistered(String),
}

#[cfg(feature = "core-integration")]
impl From<PromptError> for agent_core::Error {
    fn from(err: PromptError) -> Self {
        match err {
            PromptError::RenderError { .. } => agent_core::Error::InvalidInput(err.to_string()),
            other => agent_core::Error::ProcessingFailed(other.to_string()),
        }
    }
}
