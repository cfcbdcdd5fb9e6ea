//! Core Agent trait definition

use crate::{Context, Result};
use async_trait::async_trait;

/// Core trait that all agents must implement
///
/// Agents take a prompt, may read or update the shared [`Context`] of the run,
/// and answer with text. LLM specific message types live in `agent-llm`.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Process input and return output
    async fn process(&self, input: String, context: &mut Context) -> Result<String>;

    /// Get the agent's name
    ///
    /// Crew agents use their role as name; coworkers are addressed by it.
    fn name(&self) -> &str;

    /// Short description shown to other agents that may delegate to this one
    fn description(&self) -> &str {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait]
    impl Agent for Echo {
        async fn process(&self, input: String, _context: &mut Context) -> Result<String> {
            Ok(input)
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    #[tokio::test]
    async fn test_default_description_is_empty() {
        let agent = Echo;
        let mut ctx = Context::new();
        assert_eq!(agent.description(), "");
        assert_eq!(agent.process("hi".into(), &mut ctx).await.unwrap(), "hi");
    }
}
