//! Agent executor for running tool-use loops
//!
//! The loop:
//! 1. Call the LLM with the conversation and the available tools
//! 2. On a tool request, run the tools, append their results, loop back
//! 3. On a final answer, return it
//!
//! When the iteration cap is hit while the model still wants tools, one last
//! call without tools asks for the best final answer.

use agent_core::{Error, Result};
use agent_llm::{CompletionRequest, LLMProvider, Message, StopReason, TokenUsage, ToolDefinition};
use agent_tools::{ToolRegistry, output_text};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Prompt sent when the iteration cap is reached
pub const FORCE_FINAL_ANSWER: &str = "You have reached the maximum number of steps. Stop using tools \
and give your absolute best final answer now, using everything you have gathered so far.";

const PREVIEW_CHARS: usize = 300;

/// Callbacks fired during execution
#[async_trait]
pub trait ExecutorEventHandler: Send + Sync {
    async fn on_tool_start(&self, _id: &str, _name: &str, _input: &Value) {}

    async fn on_tool_done(
        &self,
        _id: &str,
        _name: &str,
        _result: std::result::Result<&str, &str>,
        _duration_ms: u64,
    ) {
    }

    async fn on_complete(&self, _result: &str) {}
}

/// No-op event handler for when events are not needed
pub struct NoOpEventHandler;

#[async_trait]
impl ExecutorEventHandler for NoOpEventHandler {}

/// Logs each step under the agent's name
///
/// Verbose agents log at `info`, the rest at `debug`.
pub struct StepLogger {
    agent: String,
    verbose: bool,
}

impl StepLogger {
    pub fn new(agent: impl Into<String>, verbose: bool) -> Self {
        Self {
            agent: agent.into(),
            verbose,
        }
    }
}

#[async_trait]
impl ExecutorEventHandler for StepLogger {
    async fn on_tool_start(&self, id: &str, name: &str, input: &Value) {
        let input = preview(&input.to_string());
        if self.verbose {
            info!(agent = %self.agent, tool = name, tool_id = id, %input, "Using tool");
        } else {
            debug!(agent = %self.agent, tool = name, tool_id = id, %input, "Using tool");
        }
    }

    async fn on_tool_done(
        &self,
        _id: &str,
        name: &str,
        result: std::result::Result<&str, &str>,
        duration_ms: u64,
    ) {
        match result {
            Ok(output) => {
                let output = preview(output);
                if self.verbose {
                    info!(agent = %self.agent, tool = name, duration_ms, %output, "Tool finished");
                } else {
                    debug!(agent = %self.agent, tool = name, duration_ms, %output, "Tool finished");
                }
            }
            Err(error) => {
                warn!(agent = %self.agent, tool = name, duration_ms, error, "Tool failed");
            }
        }
    }

    async fn on_complete(&self, result: &str) {
        let answer = preview(result);
        if self.verbose {
            info!(agent = %self.agent, %answer, "Final answer");
        } else {
            debug!(agent = %self.agent, %answer, "Final answer");
        }
    }
}

fn preview(text: &str) -> String {
    let mut out: String = text.chars().take(PREVIEW_CHARS).collect();
    if text.chars().count() > PREVIEW_CHARS {
        out.push_str("...");
    }
    out
}

/// Token counter shared by every agent of one run
#[derive(Debug, Clone, Default)]
pub struct UsageMeter {
    inner: Arc<Mutex<TokenUsage>>,
}

impl UsageMeter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, usage: TokenUsage) {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) += usage;
    }

    pub fn snapshot(&self) -> TokenUsage {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Configuration for agent execution
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// LLM round trips allowed before a final answer is forced
    pub max_iterations: usize,
    pub model: String,
    pub system_prompt: Option<String>,
    pub max_tokens: usize,
    pub temperature: Option<f32>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_iterations: 15,
            model: "gpt-3.5-turbo".to_string(),
            system_prompt: None,
            max_tokens: 2048,
            temperature: Some(0.7),
        }
    }
}

/// Result of one executor run
#[derive(Debug, Clone)]
pub struct ExecutionOutcome {
    pub output: String,
    pub iterations: usize,
    pub usage: TokenUsage,
    /// The final answer had to be forced after the iteration cap
    pub forced: bool,
}

/// Executes an agent loop: LLM → tool calls → execution → loop back
pub struct AgentExecutor {
    provider: Arc<dyn LLMProvider>,
    tool_registry: Arc<ToolRegistry>,
    config: ExecutorConfig,
    event_handler: Arc<dyn ExecutorEventHandler>,
    meter: Option<UsageMeter>,
    name: String,
}

impl AgentExecutor {
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        tool_registry: Arc<ToolRegistry>,
        config: ExecutorConfig,
    ) -> Self {
        Self {
            provider,
            tool_registry,
            config,
            event_handler: Arc::new(NoOpEventHandler),
            meter: None,
            name: "agent".to_string(),
        }
    }

    pub fn builder() -> AgentExecutorBuilder {
        AgentExecutorBuilder::new()
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Execute the loop for a single user message
    pub async fn run(&self, user_message: impl Into<String>) -> Result<ExecutionOutcome> {
        self.run_conversation(vec![Message::user(user_message)])
            .await
    }

    /// Execute the loop over an existing conversation
    pub async fn run_conversation(&self, mut conversation: Vec<Message>) -> Result<ExecutionOutcome> {
        let tools = self.tool_definitions();
        let mut usage = TokenUsage::default();
        let max_iterations = self.config.max_iterations.max(1);

        for iteration in 1..=max_iterations {
            debug!(
                agent = %self.name,
                iteration,
                max_iterations,
                tool_count = tools.len(),
                "Agent iteration started"
            );

            let response = self.complete(conversation.clone(), tools.clone()).await?;
            usage += response.usage;
            conversation.push(response.message.clone());

            // Some servers report "stop" even when tool calls are present.
            if response.message.has_tool_uses() {
                let results = self.execute_tools(&response.message).await;
                conversation.extend(results);
                continue;
            }

            if response.stop_reason == StopReason::MaxTokens {
                warn!(agent = %self.name, iteration, "Answer truncated by max_tokens");
            }
            if let Some(text) = response.message.text().filter(|t| !t.trim().is_empty()) {
                return Ok(self.finish(text, iteration, usage, false).await);
            }

            // An empty answer still costs an iteration.
            warn!(agent = %self.name, iteration, "Empty answer from model");
            conversation.push(Message::user(
                "Your last answer was empty. Continue the task and give your final answer.",
            ));
        }

        warn!(
            agent = %self.name,
            max_iterations,
            "Iteration limit reached, forcing final answer"
        );
        conversation.push(Message::user(FORCE_FINAL_ANSWER));
        let response = self.complete(conversation, Vec::new()).await?;
        usage += response.usage;

        match response.message.text().filter(|t| !t.trim().is_empty()) {
            Some(text) => Ok(self.finish(text, max_iterations + 1, usage, true).await),
            None => Err(Error::IterationLimit {
                agent: self.name.clone(),
                max_iterations,
            }),
        }
    }

    async fn finish(
        &self,
        output: String,
        iterations: usize,
        usage: TokenUsage,
        forced: bool,
    ) -> ExecutionOutcome {
        self.event_handler.on_complete(&output).await;
        info!(
            agent = %self.name,
            iterations,
            total_tokens = usage.total(),
            forced,
            "Agent finished"
        );
        ExecutionOutcome {
            output,
            iterations,
            usage,
            forced,
        }
    }

    async fn complete(
        &self,
        conversation: Vec<Message>,
        tools: Vec<ToolDefinition>,
    ) -> Result<agent_llm::CompletionResponse> {
        let mut builder = CompletionRequest::builder(&self.config.model)
            .messages(conversation)
            .max_tokens(self.config.max_tokens)
            .tools(tools);
        if let Some(system) = &self.config.system_prompt {
            builder = builder.system(system.clone());
        }
        if let Some(temperature) = self.config.temperature {
            builder = builder.temperature(temperature);
        }

        let response = self
            .provider
            .complete(builder.build())
            .await
            .map_err(|e| Error::ProcessingFailed(format!("{} call failed: {e}", self.provider.name())))?;

        if let Some(meter) = &self.meter {
            meter.record(response.usage);
        }
        debug!(
            agent = %self.name,
            stop_reason = ?response.stop_reason,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "LLM response received"
        );
        Ok(response)
    }

    fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tool_registry
            .list_tools()
            .iter()
            .map(|tool| ToolDefinition::new(tool.name(), tool.description(), tool.input_schema()))
            .collect()
    }

    /// Run every requested tool; failures go back to the model as tool errors
    async fn execute_tools(&self, message: &Message) -> Vec<Message> {
        let mut results = Vec::new();

        for (id, name, input) in message.tool_uses() {
            self.event_handler.on_tool_start(id, name, input).await;

            let started = Instant::now();
            let outcome = self.tool_registry.execute(name, input.clone()).await;
            let duration_ms = started.elapsed().as_millis() as u64;

            match outcome {
                Ok(value) => {
                    let text = output_text(&value);
                    self.event_handler
                        .on_tool_done(id, name, Ok(&text), duration_ms)
                        .await;
                    results.push(Message::tool_result(id, text));
                }
                Err(e) => {
                    let error = e.to_string();
                    self.event_handler
                        .on_tool_done(id, name, Err(&error), duration_ms)
                        .await;
                    results.push(Message::tool_error(id, format!("Error: {error}")));
                }
            }
        }

        results
    }
}

/// Builder for AgentExecutor
pub struct AgentExecutorBuilder {
    provider: Option<Arc<dyn LLMProvider>>,
    tool_registry: Arc<ToolRegistry>,
    config: ExecutorConfig,
    event_handler: Option<Arc<dyn ExecutorEventHandler>>,
    meter: Option<UsageMeter>,
    name: Option<String>,
}

impl AgentExecutorBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            tool_registry: Arc::new(ToolRegistry::new()),
            config: ExecutorConfig::default(),
            event_handler: None,
            meter: None,
            name: None,
        }
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn tool_registry(mut self, registry: Arc<ToolRegistry>) -> Self {
        self.tool_registry = registry;
        self
    }

    pub fn config(mut self, config: ExecutorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn max_iterations(mut self, max: usize) -> Self {
        self.config.max_iterations = max;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn event_handler(mut self, handler: Arc<dyn ExecutorEventHandler>) -> Self {
        self.event_handler = Some(handler);
        self
    }

    /// Record usage of every call into `meter`
    pub fn meter(mut self, meter: UsageMeter) -> Self {
        self.meter = Some(meter);
        self
    }

    /// Name used in logs and errors
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn build(self) -> Result<AgentExecutor> {
        let provider = self
            .provider
            .ok_or_else(|| Error::InitializationFailed("Provider not set".to_string()))?;

        let mut executor = AgentExecutor::new(provider, self.tool_registry, self.config);
        if let Some(handler) = self.event_handler {
            executor.event_handler = handler;
        }
        executor.meter = self.meter;
        if let Some(name) = self.name {
            executor.name = name;
        }
        Ok(executor)
    }
}

impl Default for AgentExecutorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
