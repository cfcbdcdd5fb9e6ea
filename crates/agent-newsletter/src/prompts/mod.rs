//! Newsletter prompt templates
//!
//! - `agents`: goal and backstory of each agent
//! - `tasks`: description and expected output of each task
//!
//! Templates read `{{ ticker }}` and `{{ current_date }}`, both supplied at
//! crew kickoff.

mod agents;
mod tasks;

pub use agents::*;
pub use tasks::*;

use agent_prompt::{PromptRegistry, Result};

/// Register every newsletter prompt with the given registry
pub fn register_prompts(registry: &PromptRegistry) -> Result<()> {
    registry.register(price_analyst_goal()?);
    registry.register(price_analyst_backstory()?);
    registry.register(news_analyst_goal()?);
    registry.register(news_analyst_backstory()?);
    registry.register(writer_goal()?);
    registry.register(writer_backstory()?);

    registry.register(get_stock_price_description()?);
    registry.register(get_stock_price_expected()?);
    registry.register(get_news_description()?);
    registry.register(get_news_expected()?);
    registry.register(write_analysis_description()?);
    registry.register(write_analysis_expected()?);

    Ok(())
}

/// Registry holding every newsletter prompt
pub fn registry() -> Result<PromptRegistry> {
    let registry = PromptRegistry::new();
    register_prompts(&registry)?;
    Ok(registry)
}
