//! Crew definition and execution

use crate::error::{Result, WorkflowError};
use crate::task::{Task, TaskOutput};
use agent_core::Context;
use agent_llm::TokenUsage;
use agent_prompt::{JinjaTemplate, PromptBuilder};
use agent_runtime::{AgentRole, Coworkers, RoleAgent, UsageMeter};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{Instrument, debug, info, info_span};

pub const MANAGER_ROLE: &str = "Crew Manager";

const MANAGER_GOAL: &str = "Manage the team to complete the task in the best way possible.";

const MANAGER_BACKSTORY: &str = "You are a seasoned manager with a knack for getting the best out of your team.
You are also known for your ability to delegate work to the right people, and to ask the right questions to get the best out of your team.
Even though you don't perform tasks by yourself, you have a lot of experience in the field, which allows you to properly evaluate the work of your team members.";

const CONTEXT_SEPARATOR: &str = "\n\n----------\n\n";

/// How the crew works through its tasks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Process {
    /// Each task goes straight to its assigned agent, in order
    #[default]
    Sequential,
    /// A manager agent receives every task and delegates to the team
    Hierarchical,
}

/// Result of a crew run
#[derive(Debug, Clone, Serialize)]
pub struct CrewOutput {
    /// Output of the last task
    pub final_output: String,
    pub tasks_output: Vec<TaskOutput>,
    /// Summed over every LLM call of the run, delegations included
    pub token_usage: TokenUsage,
}

impl CrewOutput {
    pub fn task(&self, name: &str) -> Option<&TaskOutput> {
        self.tasks_output.iter().find(|t| t.name == name)
    }
}

impl fmt::Display for CrewOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.final_output)
    }
}

/// A team of role agents working through a list of tasks
///
/// # Example
///
/// ```no_run
/// use agent_workflow::{Crew, Process, Task};
/// use agent_runtime::AgentRuntime;
/// use std::sync::Arc;
///
/// # async fn example(runtime: AgentRuntime) -> agent_workflow::Result<()> {
/// let analyst = Arc::new(runtime.role_agent(
///     agent_runtime::AgentRole::new("Analyst", "Analyze {{ ticker }}", "You analyze stocks."),
///     Vec::new(),
/// ));
///
/// let crew = Crew::builder()
///     .agent(analyst)
///     .task(Task::new("analyze", "Analyze {{ ticker }}", "A short report").agent("Analyst"))
///     .process(Process::Sequential)
///     .build()?;
///
/// let output = crew.kickoff([("ticker", "AAPL")]).await?;
/// println!("{output}");
/// # Ok(())
/// # }
/// ```
pub struct Crew {
    agents: Vec<Arc<RoleAgent>>,
    tasks: Vec<Task>,
    process: Process,
    manager: Option<Arc<RoleAgent>>,
    verbose: bool,
}

impl Crew {
    pub fn builder() -> CrewBuilder {
        CrewBuilder::default()
    }

    /// Persona of the manager agent of a hierarchical crew
    pub fn manager_role(max_iter: usize) -> AgentRole {
        AgentRole::new(MANAGER_ROLE, MANAGER_GOAL, MANAGER_BACKSTORY)
            .max_iter(max_iter)
            .allow_delegation(true)
    }

    pub fn agents(&self) -> &[Arc<RoleAgent>] {
        &self.agents
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn process(&self) -> Process {
        self.process
    }

    pub fn manager(&self) -> Option<&Arc<RoleAgent>> {
        self.manager.as_ref()
    }

    /// Run every task with the given kickoff inputs
    pub async fn kickoff<I, K, V>(&self, inputs: I) -> Result<CrewOutput>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let now = chrono::Local::now();
        let mut context = Context::new()
            .with_current_date(now.format("%Y-%m-%d").to_string())
            .with_run_id(now.format("%Y%m%dT%H%M%S%.3f").to_string());
        for (key, value) in inputs {
            context.set_input(key, value);
        }
        self.kickoff_with(context).await
    }

    /// Run every task on a prepared context
    pub async fn kickoff_with(&self, context: Context) -> Result<CrewOutput> {
        let run_id = context.run_id().unwrap_or_default().to_string();
        let span = info_span!("crew", %run_id, process = ?self.process);
        self.run_tasks(context).instrument(span).await
    }

    async fn run_tasks(&self, mut context: Context) -> Result<CrewOutput> {
        let meter = UsageMeter::new();
        let vars = Value::Object(context.template_vars());
        let mut outputs: Vec<TaskOutput> = Vec::with_capacity(self.tasks.len());

        info!(
            tasks = self.tasks.len(),
            agents = self.agents.len(),
            "Crew kickoff"
        );

        for task in &self.tasks {
            let description = JinjaTemplate::render_once(&task.name, &task.description, &vars)?;
            let expected = JinjaTemplate::render_once(&task.name, &task.expected_output, &vars)?;
            let prompt = task_prompt(&description, &expected, &context_for(task, &outputs));

            let (agent, coworkers) = self.assignee(task, &context, &meter)?;
            let tools = coworkers.as_ref().map(Coworkers::tools).unwrap_or_default();
            info!(task = %task.name, agent = agent.role(), "Task started");

            let raw = agent
                .execute_task(&prompt, &mut context, &tools, &meter)
                .await
                .map_err(|source| WorkflowError::TaskFailed {
                    task: task.name.clone(),
                    source,
                })?;

            if let Some(coworkers) = &coworkers {
                coworkers.merge_memories(&mut context);
            }
            context.set_task_output(&task.name, raw.clone());

            if self.verbose {
                info!(task = %task.name, output = %raw, "Task finished");
            } else {
                debug!(task = %task.name, chars = raw.len(), "Task finished");
            }

            outputs.push(TaskOutput {
                name: task.name.clone(),
                description,
                agent: agent.role().to_string(),
                raw,
            });
        }

        let token_usage = meter.snapshot();
        info!(
            total_tokens = token_usage.total(),
            requests = token_usage.successful_requests,
            "Crew finished"
        );

        Ok(CrewOutput {
            final_output: outputs.last().map(|o| o.raw.clone()).unwrap_or_default(),
            tasks_output: outputs,
            token_usage,
        })
    }

    /// Agent that answers for `task`, plus the coworkers it may delegate to
    fn assignee(
        &self,
        task: &Task,
        context: &Context,
        meter: &UsageMeter,
    ) -> Result<(Arc<RoleAgent>, Option<Coworkers>)> {
        match self.process {
            Process::Hierarchical => {
                let manager = self.manager.clone().ok_or(WorkflowError::MissingManager)?;
                let team = Coworkers::new(self.agents.clone(), context.clone(), meter.clone());
                Ok((manager, Some(team)))
            }
            Process::Sequential => {
                let agent = self.agent_for(task)?;
                let coworkers = if agent.spec().allow_delegation {
                    let others: Vec<_> = self
                        .agents
                        .iter()
                        .filter(|a| !Arc::ptr_eq(*a, &agent))
                        .cloned()
                        .collect();
                    Some(Coworkers::new(others, context.clone(), meter.clone()))
                        .filter(|c| !c.is_empty())
                } else {
                    None
                };
                Ok((agent, coworkers))
            }
        }
    }

    fn agent_for(&self, task: &Task) -> Result<Arc<RoleAgent>> {
        let role = task
            .agent
            .as_deref()
            .ok_or_else(|| WorkflowError::UnassignedTask(task.name.clone()))?;
        find_agent(&self.agents, role)
            .cloned()
            .ok_or_else(|| WorkflowError::UnknownAgent {
                task: task.name.clone(),
                agent: role.to_string(),
            })
    }
}

fn find_agent<'a>(agents: &'a [Arc<RoleAgent>], role: &str) -> Option<&'a Arc<RoleAgent>> {
    agents.iter().find(|a| a.role() == role)
}

/// Outputs handed to `task`: the named ones, or every earlier one
fn context_for<'a>(task: &Task, outputs: &'a [TaskOutput]) -> Vec<&'a TaskOutput> {
    if task.context.is_empty() {
        outputs.iter().collect()
    } else {
        task.context
            .iter()
            .filter_map(|name| outputs.iter().find(|o| &o.name == name))
            .collect()
    }
}

fn task_prompt(description: &str, expected_output: &str, context: &[&TaskOutput]) -> String {
    let context_text = context
        .iter()
        .map(|o| o.raw.as_str())
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR);

    PromptBuilder::new()
        .text(description)
        .blank_line()
        .text(format!(
            "This is the expected criteria for your final answer: {expected_output}"
        ))
        .newline()
        .text("You MUST return the actual complete content as the final answer, not a summary.")
        .when(
            !context.is_empty(),
            format!("\n\nThis is the context you're working with:\n{context_text}"),
        )
        .build_trimmed()
}

/// Builder for [`Crew`]; `build` checks that the task graph is runnable
#[derive(Default)]
pub struct CrewBuilder {
    agents: Vec<Arc<RoleAgent>>,
    tasks: Vec<Task>,
    process: Process,
    manager: Option<Arc<RoleAgent>>,
    verbose: bool,
}

impl CrewBuilder {
    pub fn agent(mut self, agent: Arc<RoleAgent>) -> Self {
        self.agents.push(agent);
        self
    }

    pub fn agents(mut self, agents: impl IntoIterator<Item = Arc<RoleAgent>>) -> Self {
        self.agents.extend(agents);
        self
    }

    pub fn task(mut self, task: Task) -> Self {
        self.tasks.push(task);
        self
    }

    pub fn tasks(mut self, tasks: impl IntoIterator<Item = Task>) -> Self {
        self.tasks.extend(tasks);
        self
    }

    pub fn process(mut self, process: Process) -> Self {
        self.process = process;
        self
    }

    /// Manager agent of a hierarchical crew, see [`Crew::manager_role`]
    pub fn manager(mut self, manager: Arc<RoleAgent>) -> Self {
        self.manager = Some(manager);
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn build(self) -> Result<Crew> {
        if self.tasks.is_empty() {
            return Err(WorkflowError::NoTasks);
        }
        if self.process == Process::Hierarchical && self.manager.is_none() {
            return Err(WorkflowError::MissingManager);
        }

        let mut seen = HashSet::new();
        for task in &self.tasks {
            for dependency in &task.context {
                if !seen.contains(dependency.as_str()) {
                    return Err(WorkflowError::UnknownContext {
                        task: task.name.clone(),
                        dependency: dependency.clone(),
                    });
                }
            }
            if !seen.insert(task.name.as_str()) {
                return Err(WorkflowError::DuplicateTask(task.name.clone()));
            }

            match (&task.agent, self.process) {
                (Some(role), _) if find_agent(&self.agents, role).is_none() => {
                    return Err(WorkflowError::UnknownAgent {
                        task: task.name.clone(),
                        agent: role.clone(),
                    });
                }
                (None, Process::Sequential) => {
                    return Err(WorkflowError::UnassignedTask(task.name.clone()));
                }
                _ => {}
            }
        }

        Ok(Crew {
            agents: self.agents,
            tasks: self.tasks,
            process: self.process,
            manager: self.manager,
            verbose: self.verbose,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_runtime::testing::{ScriptedProvider, tool_call};
    use agent_runtime::{DELEGATE_WORK_TOOL, LlmSettings};
    use serde_json::json;

    fn agent(provider: &Arc<ScriptedProvider>, spec: AgentRole) -> Arc<RoleAgent> {
        Arc::new(RoleAgent::new(
            spec,
            provider.clone(),
            LlmSettings::default(),
            Vec::new(),
        ))
    }

    fn analyst(provider: &Arc<ScriptedProvider>) -> Arc<RoleAgent> {
        agent(
            provider,
            AgentRole::new("Analyst", "Analyze {{ ticker }}", "You analyze stocks."),
        )
    }

    fn writer(provider: &Arc<ScriptedProvider>) -> Arc<RoleAgent> {
        agent(
            provider,
            AgentRole::new("Writer", "Write about {{ ticker }}", "You write newsletters."),
        )
    }

    fn first_prompt(provider: &ScriptedProvider, index: usize) -> String {
        provider.requests()[index].messages[0].text().unwrap()
    }

    #[tokio::test]
    async fn test_sequential_passes_previous_outputs() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            ScriptedProvider::text("AAPL is trending up"),
            ScriptedProvider::text("# Newsletter"),
        ]));
        let crew = Crew::builder()
            .agents([analyst(&provider), writer(&provider)])
            .task(Task::new("analysis", "Analyze {{ ticker }} prices", "A report").agent("Analyst"))
            .task(Task::new("newsletter", "Write the {{ ticker }} newsletter", "Markdown").agent("Writer"))
            .build()
            .unwrap();

        let output = crew.kickoff([("ticker", "AAPL")]).await.unwrap();

        assert_eq!(output.final_output, "# Newsletter");
        assert_eq!(output.to_string(), "# Newsletter");
        assert_eq!(output.tasks_output.len(), 2);
        assert_eq!(output.task("analysis").unwrap().agent, "Analyst");
        assert_eq!(output.task("analysis").unwrap().description, "Analyze AAPL prices");
        assert_eq!(
            output.token_usage,
            TokenUsage {
                input_tokens: 20,
                output_tokens: 10,
                successful_requests: 2,
            }
        );

        let first = first_prompt(&provider, 0);
        assert!(first.starts_with("Analyze AAPL prices"));
        assert!(first.contains("This is the expected criteria for your final answer: A report"));
        assert!(!first.contains("This is the context you're working with"));

        let second = first_prompt(&provider, 1);
        assert!(second.contains("This is the context you're working with:\nAAPL is trending up"));
    }

    #[tokio::test]
    async fn test_explicit_context_selects_tasks() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            ScriptedProvider::text("prices"),
            ScriptedProvider::text("news"),
            ScriptedProvider::text("done"),
        ]));
        let crew = Crew::builder()
            .agents([analyst(&provider), writer(&provider)])
            .task(Task::new("prices", "p", "e").agent("Analyst"))
            .task(Task::new("news", "n", "e").agent("Analyst"))
            .task(Task::new("write", "w", "e").agent("Writer").context(["news"]))
            .build()
            .unwrap();

        crew.kickoff([("ticker", "AAPL")]).await.unwrap();

        let third = first_prompt(&provider, 2);
        assert!(third.ends_with("This is the context you're working with:\nnews"));
    }

    #[tokio::test]
    async fn test_hierarchical_manager_delegates() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            tool_call(
                "call_1",
                DELEGATE_WORK_TOOL,
                json!({
                    "task": "Write the AAPL newsletter",
                    "context": "AAPL is up",
                    "coworker": "Writer"
                }),
            ),
            ScriptedProvider::text("Draft newsletter"),
            ScriptedProvider::text("Final newsletter"),
        ]));
        let manager = agent(&provider, Crew::manager_role(15));
        let crew = Crew::builder()
            .agents([analyst(&provider), writer(&provider)])
            .task(Task::new("newsletter", "Write about {{ ticker }}", "Markdown").agent("Writer"))
            .process(Process::Hierarchical)
            .manager(manager)
            .build()
            .unwrap();

        let output = crew.kickoff([("ticker", "AAPL")]).await.unwrap();
        assert_eq!(output.final_output, "Final newsletter");
        assert_eq!(output.tasks_output[0].agent, MANAGER_ROLE);
        assert_eq!(output.token_usage.successful_requests, 3);

        let requests = provider.requests();
        assert_eq!(requests.len(), 3);
        let manager_tools: Vec<&str> = requests[0].tools.iter().map(|t| t.name.as_str()).collect();
        assert!(manager_tools.contains(&DELEGATE_WORK_TOOL));
        assert!(requests[0].system.as_deref().unwrap().starts_with("You are Crew Manager."));
        assert!(requests[1].system.as_deref().unwrap().starts_with("You are Writer."));
        assert!(requests[1].tools.is_empty());
    }

    #[tokio::test]
    async fn test_sequential_delegation_offers_other_agents() {
        let provider = Arc::new(ScriptedProvider::new(vec![ScriptedProvider::text("ok")]));
        let delegating = agent(
            &provider,
            AgentRole::new("Analyst", "g", "b").allow_delegation(true),
        );
        let crew = Crew::builder()
            .agents([delegating, writer(&provider)])
            .task(Task::new("t", "d", "e").agent("Analyst"))
            .build()
            .unwrap();

        crew.kickoff([("ticker", "AAPL")]).await.unwrap();

        let request = &provider.requests()[0];
        assert_eq!(request.tools.len(), 2);
        assert!(request.tools[0].description.contains("Writer"));
        assert!(!request.tools[0].description.contains("Analyst"));
    }

    #[tokio::test]
    async fn test_missing_input_fails_before_any_call() {
        let provider = Arc::new(ScriptedProvider::new(Vec::new()));
        let crew = Crew::builder()
            .agent(analyst(&provider))
            .task(Task::new("t", "Analyze {{ ticker }}", "e").agent("Analyst"))
            .build()
            .unwrap();

        let err = crew.kickoff(Vec::<(String, String)>::new()).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Prompt(_)));
        assert!(provider.requests().is_empty());
    }

    #[tokio::test]
    async fn test_agent_failure_names_task() {
        let provider = Arc::new(ScriptedProvider::new(Vec::new()));
        let crew = Crew::builder()
            .agent(analyst(&provider))
            .task(Task::new("analysis", "d", "e").agent("Analyst"))
            .build()
            .unwrap();

        let err = crew.kickoff([("ticker", "AAPL")]).await.unwrap_err();
        assert!(matches!(err, WorkflowError::TaskFailed { ref task, .. } if task == "analysis"));
    }

    #[test]
    fn test_build_validation() {
        let provider = Arc::new(ScriptedProvider::new(Vec::new()));

        let err = Crew::builder().agent(analyst(&provider)).build().err().unwrap();
        assert!(matches!(err, WorkflowError::NoTasks));

        let err = Crew::builder()
            .agent(analyst(&provider))
            .task(Task::new("t", "d", "e").agent("Nobody"))
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, WorkflowError::UnknownAgent { .. }));

        let err = Crew::builder()
            .agent(analyst(&provider))
            .task(Task::new("t", "d", "e"))
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, WorkflowError::UnassignedTask(_)));

        let err = Crew::builder()
            .agent(analyst(&provider))
            .task(Task::new("a", "d", "e").agent("Analyst").context(["b"]))
            .task(Task::new("b", "d", "e").agent("Analyst"))
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, WorkflowError::UnknownContext { .. }));

        let err = Crew::builder()
            .agent(analyst(&provider))
            .task(Task::new("a", "d", "e").agent("Analyst"))
            .task(Task::new("a", "d", "e").agent("Analyst"))
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, WorkflowError::DuplicateTask(_)));

        let err = Crew::builder()
            .agent(analyst(&provider))
            .task(Task::new("a", "d", "e"))
            .process(Process::Hierarchical)
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, WorkflowError::MissingManager));
    }

    #[test]
    fn test_manager_role() {
        let role = Crew::manager_role(15);
        assert_eq!(role.role, MANAGER_ROLE);
        assert_eq!(role.max_iter, 15);
        assert!(role.allow_delegation);
    }
}
