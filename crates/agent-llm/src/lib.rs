//! LLM provider abstraction layer
//!
//! - Message types for chat turns and tool calls
//! - Completion request/response types and token accounting
//! - Tool definitions for function calling
//! - The [`LLMProvider`] trait and an OpenAI-compatible implementation
//!   (feature `openai`)

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;
pub mod tools;

pub use completion::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};
pub use error::{LLMError, Result};
pub use messages::{ContentBlock, Message, MessageContent, Role};
pub use provider::LLMProvider;
pub use tools::ToolDefinition;

#[cfg(feature = "openai")]
pub mod providers;
