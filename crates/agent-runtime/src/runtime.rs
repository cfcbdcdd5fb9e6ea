//! Shared resources for building agents
//!
//! The `AgentRuntime` owns the LLM provider and the model settings every
//! agent of a crew is created with.

use agent_core::{Error, Result};
use agent_llm::LLMProvider;
use agent_tools::Tool;
use std::sync::Arc;

use crate::agents::{AgentRole, LlmSettings, RoleAgent};

/// Factory for role agents sharing one provider
///
/// # Example
///
/// ```no_run
/// use agent_runtime::{AgentRole, AgentRuntime};
/// # fn example(provider: std::sync::Arc<dyn agent_llm::LLMProvider>) -> agent_core::Result<()> {
/// let runtime = AgentRuntime::builder()
///     .provider(provider)
///     .model("gpt-4o-mini")
///     .build()?;
///
/// let writer = runtime.role_agent(
///     AgentRole::new("Writer", "Write a newsletter", "You write newsletters."),
///     Vec::new(),
/// );
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AgentRuntime {
    provider: Arc<dyn LLMProvider>,
    llm: LlmSettings,
}

impl AgentRuntime {
    pub fn new(provider: Arc<dyn LLMProvider>, llm: LlmSettings) -> Self {
        Self { provider, llm }
    }

    pub fn builder() -> AgentRuntimeBuilder {
        AgentRuntimeBuilder::new()
    }

    pub fn provider(&self) -> &Arc<dyn LLMProvider> {
        &self.provider
    }

    pub fn llm(&self) -> &LlmSettings {
        &self.llm
    }

    /// Create a role agent with the given tools
    pub fn role_agent(&self, spec: AgentRole, tools: Vec<Arc<dyn Tool>>) -> RoleAgent {
        RoleAgent::new(spec, self.provider.clone(), self.llm.clone(), tools)
    }

    /// Same as [`role_agent`](Self::role_agent) with different model settings
    pub fn role_agent_with(
        &self,
        spec: AgentRole,
        llm: LlmSettings,
        tools: Vec<Arc<dyn Tool>>,
    ) -> RoleAgent {
        RoleAgent::new(spec, self.provider.clone(), llm, tools)
    }
}

/// Builder for AgentRuntime
#[derive(Default)]
pub struct AgentRuntimeBuilder {
    provider: Option<Arc<dyn LLMProvider>>,
    llm: LlmSettings,
}

impl AgentRuntimeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.llm.model = model.into();
        self
    }

    pub fn temperature(mut self, temperature: Option<f32>) -> Self {
        self.llm.temperature = temperature;
        self
    }

    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.llm.max_tokens = max_tokens;
        self
    }

    /// # Errors
    ///
    /// Returns an error if the provider is not set
    pub fn build(self) -> Result<AgentRuntime> {
        let provider = self
            .provider
            .ok_or_else(|| Error::InitializationFailed("Provider not set".to_string()))?;
        Ok(AgentRuntime::new(provider, self.llm))
    }
}
