//! Task definitions and outputs

use serde::{Deserialize, Serialize};

/// A unit of work for the crew
///
/// `description` and `expected_output` may reference kickoff inputs
/// (`{{ ticker }}`); they are rendered when the crew runs. `agent` is the
/// role of the agent doing the work. `context` names earlier tasks whose
/// outputs are handed to this one; when empty, every earlier output is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub name: String,
    pub description: String,
    pub expected_output: String,
    #[serde(default)]
    pub agent: Option<String>,
    #[serde(default)]
    pub context: Vec<String>,
}

impl Task {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        expected_output: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            expected_output: expected_output.into(),
            agent: None,
            context: Vec::new(),
        }
    }

    /// Assign the task to the agent with this role
    pub fn agent(mut self, role: impl Into<String>) -> Self {
        self.agent = Some(role.into());
        self
    }

    /// Hand the outputs of these tasks to this one
    pub fn context<I, S>(mut self, tasks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.context = tasks.into_iter().map(Into::into).collect();
        self
    }
}

/// What one task produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskOutput {
    pub name: String,
    /// Rendered task description
    pub description: String,
    /// Role of the agent that produced the final answer
    pub agent: String,
    pub raw: String,
}
