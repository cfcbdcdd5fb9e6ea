//! Execution context for agents
//!
//! The `Context` struct is the key-value store shared by every agent taking
//! part in one crew run: the kickoff inputs, finished task outputs and the
//! per-agent notes that make up short term memory.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Well-known context keys
pub mod keys {
    /// Kickoff inputs used for prompt interpolation (object)
    pub const INPUTS: &str = "inputs";
    /// Current date as shown to agents
    pub const CURRENT_DATE: &str = "current_date";
    /// Prefix for finished task outputs
    pub const TASK_OUTPUT_PREFIX: &str = "task_output.";
    /// Prefix for per-agent memory notes
    pub const MEMORY_PREFIX: &str = "memory.";
    /// Run identifier for log correlation
    pub const RUN_ID: &str = "run_id";
}

/// Context passed to agents during execution
///
/// # Example
///
/// ```
/// use agent_core::Context;
///
/// let mut ctx = Context::new()
///     .with_input("ticker", "AAPL")
///     .with_current_date("2024-05-01");
///
/// ctx.set_task_output("get_stock_price", "AAPL is trending up");
///
/// assert_eq!(ctx.input("ticker"), Some("AAPL"));
/// assert_eq!(ctx.task_output("get_stock_price"), Some("AAPL is trending up"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    data: HashMap<String, Value>,
}

impl Context {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    // =========== Builder Methods ===========

    /// Add a kickoff input
    pub fn with_input(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_input(key, value);
        self
    }

    /// Set the current date
    pub fn with_current_date(mut self, date: impl Into<String>) -> Self {
        self.insert(keys::CURRENT_DATE, Value::String(date.into()));
        self
    }

    /// Set the run identifier
    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.insert(keys::RUN_ID, Value::String(run_id.into()));
        self
    }

    // =========== Crew Accessors ===========

    /// Set a kickoff input
    pub fn set_input(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let entry = self
            .data
            .entry(keys::INPUTS.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        if let Value::Object(map) = entry {
            map.insert(key.into(), Value::String(value.into()));
        }
    }

    /// Get a kickoff input
    pub fn input(&self, key: &str) -> Option<&str> {
        self.get(keys::INPUTS)
            .and_then(|inputs| inputs.get(key))
            .and_then(Value::as_str)
    }

    /// All kickoff inputs plus the current date, for template rendering
    pub fn template_vars(&self) -> Map<String, Value> {
        let mut vars = self
            .get(keys::INPUTS)
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        if let Some(date) = self.current_date() {
            vars.insert(
                keys::CURRENT_DATE.to_string(),
                Value::String(date.to_string()),
            );
        }
        vars
    }

    /// Get the current date
    pub fn current_date(&self) -> Option<&str> {
        self.get(keys::CURRENT_DATE).and_then(Value::as_str)
    }

    /// Get the run identifier
    pub fn run_id(&self) -> Option<&str> {
        self.get(keys::RUN_ID).and_then(Value::as_str)
    }

    /// Store the output of a finished task
    pub fn set_task_output(&mut self, task: &str, output: impl Into<String>) {
        self.insert(
            format!("{}{task}", keys::TASK_OUTPUT_PREFIX),
            Value::String(output.into()),
        );
    }

    /// Output of a finished task
    pub fn task_output(&self, task: &str) -> Option<&str> {
        self.get(&format!("{}{task}", keys::TASK_OUTPUT_PREFIX))
            .and_then(Value::as_str)
    }

    /// Append a memory note for an agent
    pub fn remember(&mut self, agent: &str, note: impl Into<String>) {
        let entry = self
            .data
            .entry(format!("{}{agent}", keys::MEMORY_PREFIX))
            .or_insert_with(|| Value::Array(Vec::new()));
        if !entry.is_array() {
            *entry = Value::Array(Vec::new());
        }
        if let Value::Array(notes) = entry {
            notes.push(Value::String(note.into()));
        }
    }

    /// Memory notes recorded for an agent, oldest first
    pub fn memories(&self, agent: &str) -> Vec<&str> {
        self.get(&format!("{}{agent}", keys::MEMORY_PREFIX))
            .and_then(Value::as_array)
            .map(|notes| notes.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    // =========== Generic Key-Value Operations ===========

    /// Insert a value into the context
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.data.insert(key.into(), value);
    }

    /// Get a value from the context
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Insert a typed value into the context
    ///
    /// Serializes the value to JSON before storing.
    pub fn insert_typed<T: Serialize>(
        &mut self,
        key: impl Into<String>,
        value: &T,
    ) -> crate::Result<()> {
        let json_value = serde_json::to_value(value).map_err(|e| {
            crate::Error::ProcessingFailed(format!("Failed to serialize context value: {e}"))
        })?;
        self.data.insert(key.into(), json_value);
        Ok(())
    }

    /// Get a typed value from the context
    pub fn get_typed<T: for<'de> Deserialize<'de>>(&self, key: &str) -> crate::Result<Option<T>> {
        match self.data.get(key) {
            None => Ok(None),
            Some(value) => {
                let typed = serde_json::from_value(value.clone()).map_err(|e| {
                    crate::Error::ProcessingFailed(format!(
                        "Failed to deserialize context value: {e}"
                    ))
                })?;
                Ok(Some(typed))
            }
        }
    }

    /// Check if a key exists in the context
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Remove a value from the context
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.remove(key)
    }

    /// Get the number of entries in the context
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the context is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
