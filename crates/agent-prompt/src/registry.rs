//! Prompt template registry

use crate::{PromptError, PromptTemplate, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Thread-safe store of named templates
///
/// ```
/// use agent_prompt::{JinjaTemplate, PromptRegistry};
/// use serde_json::json;
///
/// let registry = PromptRegistry::new();
/// registry.register(JinjaTemplate::new("goal", "Find the {{ ticker }} stock price").unwrap());
///
/// let text = registry.render("goal", &json!({ "ticker": "MSFT" })).unwrap();
/// assert_eq!(text, "Find the MSFT stock price");
/// ```
#[derive(Default)]
pub struct PromptRegistry {
    templates: RwLock<HashMap<String, Arc<dyn PromptTemplate>>>,
}

impl PromptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template, replacing one with the same name
    pub fn register<T: PromptTemplate + 'static>(&self, template: T) {
        let mut templates = self
            .templates
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        templates.insert(template.name().to_string(), Arc::new(template));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn PromptTemplate>> {
        self.templates
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .templates
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Render a registered template
    pub fn render(&self, name: &str, vars: &Value) -> Result<String> {
        self.get(name)
            .ok_or_else(|| PromptError::TemplateNotRegistered(name.to_string()))?
            .render(vars)
    }

    /// Raw source of a registered template
    pub fn source(&self, name: &str) -> Result<String> {
        self.get(name)
            .map(|t| t.source().to_string())
            .ok_or_else(|| PromptError::TemplateNotRegistered(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.templates
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
    use crate::JinjaTemplate;
    use serde_json::json;

    #[test]
    fn test_register_and_render() {
        let registry = PromptRegistry::new();
        assert!(registry.is_empty());

        registry.register(JinjaTemplate::new("a", "A {{ x }}").unwrap());
        registry.register(JinjaTemplate::new("b", "B").unwrap());

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names(), vec!["a", "b"]);
        assert_eq!(registry.render("a", &json!({"x": 1})).unwrap(), "A 1");
        assert_eq!(registry.source("a").unwrap(), "A {{ x }}");
    }

    #[test]
    fn test_unknown_template() {
        let registry = PromptRegistry::new();
        assert!(!registry.contains("missing"));
        assert!(matches!(
            registry.render("missing", &json!({})),
            Err(PromptError::TemplateNotRegistered(name)) if name == "missing"
        ));
    }

    #[test]
    fn test_replace_existing() {
        let registry = PromptRegistry::new();
        registry.register(JinjaTemplate::new("a", "old").unwrap());
        registry.register(JinjaTemplate::new("a", "new").unwrap());
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.render("a", &json!({})).unwrap(), "new");
    }
}
