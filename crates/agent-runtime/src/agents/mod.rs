//! Concrete agent implementations
//!
//! - RoleAgent: persona-driven agent with tools and an iteration cap
//! - Coworkers: delegation tools that let one agent hand work to others

pub mod delegation;
pub mod role;

pub use delegation::{
    ASK_QUESTION_TOOL, AskQuestionTool, Coworkers, DELEGATE_WORK_TOOL, DelegateWorkTool,
};
pub use role::{AgentRole, LlmSettings, RoleAgent};
