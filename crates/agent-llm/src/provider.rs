//! LLM provider trait definition

use crate::{CompletionRequest, CompletionResponse, Result};
use async_trait::async_trait;

/// A chat-completion backend
///
/// The executor only needs one call per turn; streaming is not used.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Run one completion over the full conversation in `request`
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Provider name for logs (e.g. "openai")
    fn name(&self) -> &str;
}
