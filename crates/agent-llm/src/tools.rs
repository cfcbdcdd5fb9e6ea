//! Function definitions offered to the model

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A callable function as advertised to the model
///
/// `name` must match the tool registered in the agent's `ToolRegistry`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON schema of the arguments object
    pub input_schema: Value,
}

impl ToolDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// Small JSON schema helpers
pub mod schema {
    use serde_json::{Value, json};

    /// Object schema with the given properties
    ///
    /// ```
    /// use agent_llm::tools::schema;
    /// use serde_json::json;
    ///
    /// let s = schema::object(json!({ "query": schema::string("Search query") }), &["query"]);
    /// assert_eq!(s["required"][0], "query");
    /// ```
    pub fn object(properties: Value, required: &[&str]) -> Value {
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    pub fn string(description: &str) -> Value {
        json!({ "type": "string", "description": description })
    }

    pub fn integer(description: &str) -> Value {
        json!({ "type": "integer", "description": description })
    }
}
