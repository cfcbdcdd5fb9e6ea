//! Crew errors

use agent_prompt::PromptError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Crew has no tasks")]
    NoTasks,

    #[error("Duplicate task name '{0}'")]
    DuplicateTask(String),

    #[error("Task '{0}' has no agent assigned")]
    UnassignedTask(String),

    #[error("Task '{task}' is assigned to unknown agent '{agent}'")]
    UnknownAgent { task: String, agent: String },

    #[error("Task '{task}' needs the output of '{dependency}', which does not run before it")]
    UnknownContext { task: String, dependency: String },

    #[error("A hierarchical crew needs a manager agent")]
    MissingManager,

    #[error("Template error: {0}")]
    Prompt(#[from] PromptError),

    #[error("Task '{task}' failed: {source}")]
    TaskFailed {
        task: String,
        #[source]
        source: agent_core::Error,
    },
}

pub type Result<T> = std::result::Result<T, WorkflowError>;
