//! Role-configured agents
//!
//! A [`RoleAgent`] is an LLM persona (role, goal, backstory) with its own
//! tools and iteration cap. Each task it receives runs through a fresh
//! [`AgentExecutor`].

use crate::executor::{AgentExecutor, ExecutorConfig, StepLogger, UsageMeter};
use agent_core::{Agent, Context, Result};
use agent_llm::LLMProvider;
use agent_prompt::{JinjaTemplate, PromptBuilder};
use agent_tools::{Tool, ToolRegistry};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

const MEMORY_NOTE_CHARS: usize = 1200;

/// Persona and limits of an agent
///
/// `role`, `goal` and `backstory` may reference kickoff inputs such as
/// `{{ ticker }}`; they are rendered per task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRole {
    pub role: String,
    pub goal: String,
    pub backstory: String,
    /// LLM round trips per task before a final answer is forced
    pub max_iter: usize,
    /// Carry notes from earlier tasks of the same run into later ones
    pub memory: bool,
    /// May hand work to coworkers through the delegation tools
    pub allow_delegation: bool,
    /// Log every step at info level
    pub verbose: bool,
}

impl AgentRole {
    pub fn new(
        role: impl Into<String>,
        goal: impl Into<String>,
        backstory: impl Into<String>,
    ) -> Self {
        Self {
            role: role.into(),
            goal: goal.into(),
            backstory: backstory.into(),
            max_iter: 15,
            memory: false,
            allow_delegation: false,
            verbose: false,
        }
    }

    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn memory(mut self, memory: bool) -> Self {
        self.memory = memory;
        self
    }

    pub fn allow_delegation(mut self, allow: bool) -> Self {
        self.allow_delegation = allow;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// Model settings shared by the agents of a crew
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: usize,
}

impl Default for LlmSettings {
    fn default() -> Self {
        let executor = ExecutorConfig::default();
        Self {
            model: executor.model,
            temperature: executor.temperature,
            max_tokens: executor.max_tokens,
        }
    }
}

/// An LLM agent playing a role
pub struct RoleAgent {
    spec: AgentRole,
    provider: Arc<dyn LLMProvider>,
    llm: LlmSettings,
    tools: Vec<Arc<dyn Tool>>,
}

impl RoleAgent {
    pub fn new(
        spec: AgentRole,
        provider: Arc<dyn LLMProvider>,
        llm: LlmSettings,
        tools: Vec<Arc<dyn Tool>>,
    ) -> Self {
        Self {
            spec,
            provider,
            llm,
            tools,
        }
    }

    pub fn spec(&self) -> &AgentRole {
        &self.spec
    }

    pub fn role(&self) -> &str {
        &self.spec.role
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Work on one task prompt
    ///
    /// `extra_tools` are offered on top of the agent's own tools for this
    /// task only (the crew passes delegation tools here). Usage of every LLM
    /// call is recorded in `meter`.
    pub async fn execute_task(
        &self,
        prompt: &str,
        context: &mut Context,
        extra_tools: &[Arc<dyn Tool>],
        meter: &UsageMeter,
    ) -> Result<String> {
        let system_prompt = self.system_prompt(context)?;

        let registry = ToolRegistry::new();
        for tool in self.tools.iter().chain(extra_tools) {
            registry.register(tool.clone());
        }

        let executor = AgentExecutor::builder()
            .provider(self.provider.clone())
            .tool_registry(Arc::new(registry))
            .config(ExecutorConfig {
                max_iterations: self.spec.max_iter,
                model: self.llm.model.clone(),
                system_prompt: Some(system_prompt),
                max_tokens: self.llm.max_tokens,
                temperature: self.llm.temperature,
            })
            .event_handler(Arc::new(StepLogger::new(
                self.spec.role.clone(),
                self.spec.verbose,
            )))
            .meter(meter.clone())
            .name(self.spec.role.clone())
            .build()?;

        let outcome = executor.run(prompt).await?;

        if self.spec.memory {
            context.remember(&self.spec.role, memory_note(prompt, &outcome.output));
        }
        Ok(outcome.output)
    }

    /// Persona prompt with inputs interpolated and memory notes appended
    pub fn system_prompt(&self, context: &Context) -> Result<String> {
        let vars = Value::Object(context.template_vars());
        let role = JinjaTemplate::render_once("role", &self.spec.role, &vars)?;
        let goal = JinjaTemplate::render_once("goal", &self.spec.goal, &vars)?;
        let backstory = JinjaTemplate::render_once("backstory", &self.spec.backstory, &vars)?;

        let memories = if self.spec.memory {
            context.memories(&self.spec.role)
        } else {
            Vec::new()
        };

        Ok(PromptBuilder::new()
            .text(format!("You are {role}. {backstory}"))
            .newline()
            .text(format!("Your personal goal is: {goal}"))
            .when_some(context.current_date(), |b, date| {
                b.newline().text(format!("The current date is {date}."))
            })
            .when(
                !memories.is_empty(),
                "\n\n## Notes from your earlier work in this run\n",
            )
            .bullets(memories)
            .when(
                !self.tools.is_empty(),
                "\n\nUse the tools available to you whenever they help. \
                 When you are done, reply with your complete final answer only.",
            )
            .build_trimmed())
    }
}

fn memory_note(prompt: &str, output: &str) -> String {
    let task: String = prompt.lines().next().unwrap_or_default().chars().take(200).collect();
    let mut result: String = output.chars().take(MEMORY_NOTE_CHARS).collect();
    if output.chars().count() > MEMORY_NOTE_CHARS {
        result.push_str("...");
    }
    format!("Task: {task} | Result: {result}")
}

#[async_trait]
impl Agent for RoleAgent {
    async fn process(&self, input: String, context: &mut Context) -> Result<String> {
        self.execute_task(&input, context, &[], &UsageMeter::new())
            .await
    }

    fn name(&self) -> &str {
        &self.spec.role
    }

    fn description(&self) -> &str {
        &self.spec.goal
    }
}
