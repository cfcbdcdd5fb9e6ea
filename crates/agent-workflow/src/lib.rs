//! Multi-agent orchestration for crew-rs
//!
//! A [`Crew`] runs a list of [`Task`]s with a team of role agents, either
//! one after another or under a manager agent that delegates the work.

pub mod crew;
pub mod error;
pub mod task;

// Re-export for convenience
pub use crew::{Crew, CrewBuilder, CrewOutput, MANAGER_ROLE, Process};
pub use error::{Result, WorkflowError};
pub use task::{Task, TaskOutput};
