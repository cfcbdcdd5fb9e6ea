//! Per-agent tool registry

use crate::Tool;
use agent_core::{Error, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Tools available to one agent, keyed by name
///
/// Iteration order is by name so the tool list sent to the model is stable.
#[derive(Default)]
pub struct ToolRegistry {
    tools: RwLock<BTreeMap<String, Arc<dyn Tool>>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`ToolRegistry::register`]
    pub fn with_tool(self, tool: Arc<dyn Tool>) -> Self {
        self.register(tool);
        self
    }

    /// Register a tool, replacing one with the same name
    pub fn register(&self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        let mut tools = self.tools.write().unwrap_or_else(PoisonError::into_inner);
        if tools.insert(name.clone(), tool).is_some() {
            tracing::debug!(tool = %name, "Replaced registered tool");
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        let tools = self.tools.read().unwrap_or_else(PoisonError::into_inner);
        tools.get(name).cloned()
    }

    /// All tools, ordered by name
    pub fn list_tools(&self) -> Vec<Arc<dyn Tool>> {
        let tools = self.tools.read().unwrap_or_else(PoisonError::into_inner);
        tools.values().cloned().collect()
    }

    pub fn names(&self) -> Vec<String> {
        let tools = self.tools.read().unwrap_or_else(PoisonError::into_inner);
        tools.keys().cloned().collect()
    }

    /// Run a tool by name
    pub async fn execute(&self, name: &str, params: Value) -> Result<Value> {
        let tool = self.get(name).ok_or_else(|| {
            Error::tool(
                name,
                format!("unknown tool, available: {}", self.names().join(", ")),
            )
        })?;
        tool.execute(params).await
    }

    pub fn len(&self) -> usize {
        self.tools
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    struct Upper;

    #[async_trait]
    impl Tool for Upper {
        async fn execute(&self, params: Value) -> Result<Value> {
            let text = params["text"].as_str().unwrap_or_default();
            Ok(json!(text.to_uppercase()))
        }

        fn name(&self) -> &str {
            "upper"
        }

        fn description(&self) -> &str {
            "Uppercase text"
        }

        fn input_schema(&self) -> Value {
            json!({"type": "object", "properties": {"text": {"type": "string"}}})
        }
    }

    struct Named(&'static str);

    #[async_trait]
    impl Tool for Named {
        async fn execute(&self, _params: Value) -> Result<Value> {
            Ok(Value::Null)
        }

        fn name(&self) -> &str {
            self.0
        }

        fn description(&self) -> &str {
            ""
        }

        fn input_schema(&self) -> Value {
            json!({"type": "object"})
        }
    }

    #[tokio::test]
    async fn test_execute_by_name() {
        let registry = ToolRegistry::new().with_tool(Arc::new(Upper));
        let out = registry
            .execute("upper", json!({"text": "btc"}))
            .await
            .unwrap();
        assert_eq!(out, json!("BTC"));
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let registry = ToolRegistry::new().with_tool(Arc::new(Upper));
        let err = registry.execute("missing", json!({})).await.unwrap_err();
        assert!(err.to_string().contains("available: upper"));
    }

    #[test]
    fn test_sorted_listing_and_replace() {
        let registry = ToolRegistry::new();
        assert!(registry.is_empty());

        registry.register(Arc::new(Named("zeta")));
        registry.register(Arc::new(Named("alpha")));
        registry.register(Arc::new(Named("alpha")));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names(), vec!["alpha", "zeta"]);
        assert_eq!(registry.list_tools()[0].name(), "alpha");
    }
}
