//! Core prompt template trait

use crate::Result;
use serde_json::Value;

/// A named prompt that renders against a JSON object of variables
///
/// Dyn-compatible so registries can hold mixed implementations.
pub trait PromptTemplate: Send + Sync {
    /// Template name/identifier
    fn name(&self) -> &str;

    /// Render with the given variables
    fn render(&self, vars: &Value) -> Result<String>;

    /// Raw template source, for inspection
    fn source(&self) -> &str;
}
