//! MiniJinja-backed templates
//!
//! Variables are strict: rendering fails when the template references a
//! variable the caller did not provide, instead of silently printing nothing.

use crate::{PromptError, PromptTemplate, Result};
use minijinja::{Environment, UndefinedBehavior};
use serde_json::Value;

/// A prompt template backed by MiniJinja
///
/// ```
/// use agent_prompt::{JinjaTemplate, PromptTemplate};
/// use serde_json::json;
///
/// let template = JinjaTemplate::new("goal", "Find the {{ ticker }} stock price").unwrap();
/// let text = template.render(&json!({ "ticker": "AAPL" })).unwrap();
/// assert_eq!(text, "Find the AAPL stock price");
/// ```
#[derive(Debug, Clone)]
pub struct JinjaTemplate {
    name: String,
    source: String,
}

impl JinjaTemplate {
    /// Create a template, checking that the source parses
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let source = source.into();

        let env = environment();
        env.template_from_str(&source)
            .map_err(|e| PromptError::TemplateParseFailed {
                name: name.clone(),
                detail: e.to_string(),
            })?;

        Ok(Self { name, source })
    }

    /// Render an ad-hoc template string once
    pub fn render_once(name: &str, source: &str, vars: &Value) -> Result<String> {
        Self::new(name, source)?.render(vars)
    }

    /// Names of the top-level variables the template reads
    pub fn variables(&self) -> Vec<String> {
        let env = environment();
        let mut names: Vec<String> = env
            .template_from_str(&self.source)
            .map(|t| t.undeclared_variables(false).into_iter().collect())
            .unwrap_or_default();
        names.sort();
        names
    }
}

fn environment<'source>() -> Environment<'source> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.set_keep_trailing_newline(true);
    env
}

impl PromptTemplate for JinjaTemplate {
    fn name(&self) -> &str {
        &self.name
    }

    fn render(&self, vars: &Value) -> Result<String> {
        let env = environment();
        env.render_str(&self.source, minijinja::Value::from_serialize(vars))
            .map_err(|e| PromptError::RenderError {
                name: self.name.clone(),
                detail: e.to_string(),
            })
    }

    fn source(&self) -> &str {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_with_vars() {
        let template = JinjaTemplate::new(
            "task",
            "Analyze the stock {{ ticker }} price history. Today is {{ current_date }}.",
        )
        .unwrap();

        let text = template
            .render(&json!({ "ticker": "NVDA", "current_date": "2024-05-01" }))
            .unwrap();
        assert_eq!(
            text,
            "Analyze the stock NVDA price history. Today is 2024-05-01."
        );
    }

    #[test]
    fn test_missing_variable_is_an_error() {
        let template = JinjaTemplate::new("goal", "Find the {{ ticker }} stock price").unwrap();
        let err = template.render(&json!({})).unwrap_err();
        assert!(matches!(err, PromptError::RenderError { ref name, .. } if name == "goal"));
    }

    #[test]
    fn test_parse_error() {
        let err = JinjaTemplate::new("broken", "Hello {{ name").unwrap_err();
        assert!(matches!(err, PromptError::TemplateParseFailed { .. }));
    }

    #[test]
    fn test_builtin_filters() {
        let text =
            JinjaTemplate::render_once("f", "{{ ticker | upper }}", &json!({ "ticker": "btc" }))
                .unwrap();
        assert_eq!(text, "BTC");
    }

    #[test]
    fn test_plain_text_passes_through() {
        let source = "Specify the current trend stock price - up, down or sideways. eg. stock = 'APPL, price'";
        let text = JinjaTemplate::render_once("plain", source, &json!({})).unwrap();
        assert_eq!(text, source);
    }

    #[test]
    fn test_variables() {
        let template =
            JinjaTemplate::new("t", "{{ ticker }} on {{ current_date }} ({{ ticker }})").unwrap();
        assert_eq!(template.variables(), vec!["current_date", "ticker"]);
    }
}
