//! Shared utilities for the newsletter crew
//!
//! Logging setup and the secrets store used to hand the LLM credential to
//! the rest of the workspace.

pub mod config;
pub mod logging;

pub use config::{ConfigError, SecretStore};
pub use logging::{LoggingOptions, init_tracing, init_tracing_with};
