//! Error types for the newsletter pipeline

use thiserror::Error;

/// Message shown when the ticker field is left blank
pub const EMPTY_TICKER_MESSAGE: &str = "Please fill the ticket field";

/// Newsletter specific errors
#[derive(Debug, Error)]
pub enum NewsletterError {
    /// Blank or whitespace-only ticker
    #[error("Please fill the ticket field")]
    EmptyTicker,

    /// Ticker with characters no exchange symbol uses
    #[error("Invalid ticker: {0}")]
    InvalidTicker(String),

    /// The data source answered but had nothing for the symbol
    #[error("Data not available for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    /// Yahoo Finance API error
    #[error("Yahoo Finance error: {0}")]
    YahooFinance(String),

    /// News search API error
    #[error("News search error: {0}")]
    Search(String),

    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Prompt template error
    #[error("Template error: {0}")]
    Template(#[from] agent_prompt::PromptError),

    /// The crew run failed
    #[error(transparent)]
    Workflow(#[from] agent_workflow::WorkflowError),

    /// Agent framework error
    #[error("Agent error: {0}")]
    Agent(#[from] agent_core::Error),

    /// Model provider setup or call failed
    #[error("LLM error: {0}")]
    Llm(#[from] agent_llm::LLMError),
}

impl NewsletterError {
    /// Errors caused by the user's input rather than by a service
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::EmptyTicker | Self::InvalidTicker(_))
    }
}

/// Result type alias for newsletter operations
pub type Result<T> = std::result::Result<T, NewsletterError>;

/// Convert NewsletterError to agent_core::Error
impl From<NewsletterError> for agent_core::Error {
    fn from(err: NewsletterError) -> Self {
        match err {
            NewsletterError::EmptyTicker | NewsletterError::InvalidTicker(_) => {
                agent_core::Error::InvalidInput(err.to_string())
            }
            NewsletterError::Agent(inner) => inner,
            other => agent_core::Error::ProcessingFailed(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(NewsletterError::EmptyTicker.to_string(), EMPTY_TICKER_MESSAGE);

        let err = NewsletterError::DataUnavailable {
            symbol: "AAPL".to_string(),
            reason: "no rows".to_string(),
        };
        assert_eq!(err.to_string(), "Data not available for AAPL: no rows");
    }

    #[test]
    fn test_user_errors() {
        assert!(NewsletterError::EmptyTicker.is_user_error());
        assert!(NewsletterError::InvalidTicker("A B".into()).is_user_error());
        assert!(!NewsletterError::Search("down".into()).is_user_error());
    }

    #[test]
    fn test_agent_error_conversion() {
        let err: NewsletterError = agent_core::Error::InvalidInput("x".into()).into();
        assert!(matches!(err, NewsletterError::Agent(_)));
    }
}
