//! Coworker delegation tools
//!
//! An agent allowed to delegate gets two extra tools: one hands a whole
//! piece of work to a coworker, the other asks a coworker a question.
//! Coworkers run without delegation tools, so delegation never recurses.

use crate::agents::role::RoleAgent;
use crate::executor::UsageMeter;
use agent_core::{Context, Error, Result};
use agent_llm::tools::schema;
use agent_tools::Tool;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::info;

pub const DELEGATE_WORK_TOOL: &str = "delegate_work_to_coworker";
pub const ASK_QUESTION_TOOL: &str = "ask_question_to_coworker";

/// The agents a delegating agent may call on during one task
///
/// Coworkers work on a snapshot of the run context. Memory notes they write
/// are collected and can be merged back with [`Coworkers::merge_memories`].
#[derive(Clone)]
pub struct Coworkers {
    agents: Vec<Arc<RoleAgent>>,
    context: Context,
    meter: UsageMeter,
    notes: Arc<Mutex<Vec<(String, String)>>>,
}

impl Coworkers {
    pub fn new(agents: Vec<Arc<RoleAgent>>, context: Context, meter: UsageMeter) -> Self {
        Self {
            agents,
            context,
            meter,
            notes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn roles(&self) -> Vec<&str> {
        self.agents.iter().map(|a| a.role()).collect()
    }

    /// The two delegation tools over these coworkers
    pub fn tools(&self) -> Vec<Arc<dyn Tool>> {
        vec![
            Arc::new(DelegateWorkTool::new(self.clone())),
            Arc::new(AskQuestionTool::new(self.clone())),
        ]
    }

    /// Copy memory notes written by coworkers into `context`
    pub fn merge_memories(&self, context: &mut Context) {
        let notes = std::mem::take(&mut *self.notes.lock().unwrap_or_else(PoisonError::into_inner));
        for (role, note) in notes {
            context.remember(&role, note);
        }
    }

    /// Models often quote or re-case the role; match loosely
    fn find(&self, coworker: &str) -> Result<&Arc<RoleAgent>> {
        let wanted = normalize(coworker);
        self.agents
            .iter()
            .find(|a| normalize(a.role()) == wanted)
            .ok_or_else(|| {
                Error::InvalidInput(format!(
                    "Coworker '{coworker}' not found, it must be one of: {}",
                    self.roles().join(", ")
                ))
            })
    }

    async fn run(&self, coworker: &str, prompt: String) -> Result<String> {
        let agent = self.find(coworker)?;
        info!(coworker = agent.role(), "Delegating to coworker");

        let mut context = self.context.clone();
        let before = context.memories(agent.role()).len();
        let output = agent
            .execute_task(&prompt, &mut context, &[], &self.meter)
            .await?;

        let fresh: Vec<(String, String)> = context
            .memories(agent.role())
            .into_iter()
            .skip(before)
            .map(|note| (agent.role().to_string(), note.to_string()))
            .collect();
        self.notes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(fresh);

        Ok(output)
    }
}

fn normalize(name: &str) -> String {
    name.trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim()
        .to_lowercase()
}

fn with_context(request: &str, context: &str) -> String {
    if context.trim().is_empty() {
        request.to_string()
    } else {
        format!("{request}\n\nThis is the context you're working with:\n{context}")
    }
}

#[derive(Debug, Deserialize)]
struct DelegateParams {
    task: String,
    #[serde(default)]
    context: String,
    coworker: String,
}

#[derive(Debug, Deserialize)]
struct AskParams {
    question: String,
    #[serde(default)]
    context: String,
    coworker: String,
}

fn parse<T: for<'de> Deserialize<'de>>(tool: &str, params: Value) -> Result<T> {
    serde_json::from_value(params).map_err(|e| Error::tool(tool, format!("invalid arguments: {e}")))
}

/// Hands a task to a coworker and returns the coworker's answer
pub struct DelegateWorkTool {
    coworkers: Coworkers,
    description: String,
}

impl DelegateWorkTool {
    pub fn new(coworkers: Coworkers) -> Self {
        let description = format!(
            "Delegate a specific task to one of the following coworkers: {}\n\
             The input to this tool should be the coworker, the task you want them to do, \
             and ALL necessary context to execute the task. They know nothing about the task, \
             so share absolutely everything you know; don't reference things but explain them.",
            coworkers.roles().join(", ")
        );
        Self {
            coworkers,
            description,
        }
    }
}

#[async_trait]
impl Tool for DelegateWorkTool {
    async fn execute(&self, params: Value) -> Result<Value> {
        let params: DelegateParams = parse(DELEGATE_WORK_TOOL, params)?;
        let output = self
            .coworkers
            .run(&params.coworker, with_context(&params.task, &params.context))
            .await?;
        Ok(json!(output))
    }

    fn name(&self) -> &str {
        DELEGATE_WORK_TOOL
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({
                "task": schema::string("The task to delegate"),
                "context": schema::string("Everything the coworker needs to know"),
                "coworker": schema::string("Role of the coworker to delegate to"),
            }),
            &["task", "context", "coworker"],
        )
    }
}

/// Asks a coworker a question and returns the answer
pub struct AskQuestionTool {
    coworkers: Coworkers,
    description: String,
}

impl AskQuestionTool {
    pub fn new(coworkers: Coworkers) -> Self {
        let description = format!(
            "Ask a specific question to one of the following coworkers: {}\n\
             The input to this tool should be the coworker, the question you have for them, \
             and ALL necessary context to ask the question properly. They know nothing about \
             the question, so share absolutely everything you know; don't reference things \
             but explain them.",
            coworkers.roles().join(", ")
        );
        Self {
            coworkers,
            description,
        }
    }
}

#[async_trait]
impl Tool for AskQuestionTool {
    async fn execute(&self, params: Value) -> Result<Value> {
        let params: AskParams = parse(ASK_QUESTION_TOOL, params)?;
        let output = self
            .coworkers
            .run(
                &params.coworker,
                with_context(&params.question, &params.context),
            )
            .await?;
        Ok(json!(output))
    }

    fn name(&self) -> &str {
        ASK_QUESTION_TOOL
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({
                "question": schema::string("The question to ask"),
                "context": schema::string("Everything the coworker needs to know"),
                "coworker": schema::string("Role of the coworker to ask"),
            }),
            &["question", "context", "coworker"],
        )
    }
}
