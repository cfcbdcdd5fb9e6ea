//! Prompt templates for the newsletter crew
//!
//! - [`JinjaTemplate`]: MiniJinja templates with strict variables, used to
//!   interpolate kickoff inputs such as `{{ ticker }}` into agent and task text
//! - [`PromptRegistry`]: named, thread-safe template store
//! - [`PromptBuilder`]: fluent assembly of system and task prompts
//!
//! ```
//! use agent_prompt::{JinjaTemplate, PromptRegistry};
//! use serde_json::json;
//!
//! let registry = PromptRegistry::new();
//! registry.register(JinjaTemplate::new("goal", "Find the {{ ticker }} stock price").unwrap());
//!
//! let text = registry.render("goal", &json!({ "ticker": "AAPL" })).unwrap();
//! assert_eq!(text, "Find the AAPL stock price");
//! ```

mod builder;
mod error;
mod jinja;
mod registry;
mod template;

pub use builder::PromptBuilder;
pub use error::{PromptError, Result};
pub use jinja::JinjaTemplate;
pub use registry::PromptRegistry;
pub use template::PromptTemplate;
