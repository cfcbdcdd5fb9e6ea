//! Tool framework for the newsletter crew
//!
//! Tools are the functions agents call through the model's function-calling
//! interface: price history, news search and coworker delegation.

pub mod registry;
pub mod tool;

pub use registry::ToolRegistry;
pub use tool::{Tool, output_text};
