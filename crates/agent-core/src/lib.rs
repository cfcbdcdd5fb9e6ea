//! Core abstractions for the newsletter crew
//!
//! The `Agent` trait, the shared run `Context` and the base error type.

pub mod agent;
pub mod context;
pub mod error;

pub use agent::Agent;
pub use context::Context;
pub use error::{Error, Result};
