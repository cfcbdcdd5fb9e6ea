//! Tool trait definition

use agent_core::Result;
use async_trait::async_trait;
use serde_json::Value;

/// A function an agent may call while working on a task
///
/// Tools return JSON; a `Value::String` result is handed to the model
/// verbatim, anything else is sent as serialized JSON.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Execute the tool with arguments matching [`Tool::input_schema`]
    async fn execute(&self, params: Value) -> Result<Value>;

    /// Function name; unique within a registry and safe for function calling
    /// (`[a-zA-Z0-9_-]`)
    fn name(&self) -> &str;

    /// Description the model uses to decide when to call the tool
    fn description(&self) -> &str;

    /// JSON schema of the arguments object
    fn input_schema(&self) -> Value;
}

/// Render a tool result as the text handed back to the model
pub fn output_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
