//! Agent runtime for executing role agents
//!
//! This crate provides the [`AgentExecutor`] LLM loop with its iteration
//! cap, [`RoleAgent`] personas, coworker delegation tools and the
//! [`AgentRuntime`] factory that wires agents to a shared provider.

pub mod agents;
pub mod executor;
pub mod runtime;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use agents::{
    ASK_QUESTION_TOOL, AgentRole, AskQuestionTool, Coworkers, DELEGATE_WORK_TOOL,
    DelegateWorkTool, LlmSettings, RoleAgent,
};
pub use executor::{
    AgentExecutor, AgentExecutorBuilder, ExecutionOutcome, ExecutorConfig, ExecutorEventHandler,
    FORCE_FINAL_ANSWER, NoOpEventHandler, StepLogger, UsageMeter,
};
pub use runtime::{AgentRuntime, AgentRuntimeBuilder};
