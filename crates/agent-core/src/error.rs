//! Error types for agent-core

use thiserror::Error;

/// Result type alias for agent-core
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for agent operations
#[derive(Error, Debug)]
pub enum Error {
    /// Generic error message
    #[error("{0}")]
    Generic(String),

    /// Agent initialization failed
    #[error("Agent initialization failed: {0}")]
    InitializationFailed(String),

    /// Agent processing failed
    #[error("Agent processing failed: {0}")]
    ProcessingFailed(String),

    /// Input rejected before any work was done
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A tool call failed
    #[error("Tool '{tool}' failed: {message}")]
    ToolFailed { tool: String, message: String },

    /// The agent ran out of iterations without a final answer
    #[error("Agent '{agent}' reached its iteration limit ({max_iterations}) without a final answer")]
    IterationLimit { agent: String, max_iterations: usize },
}

impl Error {
    /// Build a [`Error::ToolFailed`]
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolFailed {
            tool: tool.into(),
            message: message.into(),
        }
    }
}
