//! The three newsletter agents

use agent_prompt::PromptRegistry;
use agent_runtime::{AgentRole, AgentRuntime, RoleAgent};
use agent_tools::Tool;
use std::sync::Arc;

use crate::api::{NewsSearch, PriceSource};
use crate::config::NewsletterConfig;
use crate::error::Result;
use crate::prompts::{
    NEWS_ANALYST_BACKSTORY, NEWS_ANALYST_GOAL, NEWS_ANALYST_ROLE, PRICE_ANALYST_BACKSTORY,
    PRICE_ANALYST_GOAL, PRICE_ANALYST_ROLE, WRITER_BACKSTORY, WRITER_GOAL, WRITER_ROLE,
};
use crate::tools::{NewsSearchTool, YahooFinanceTool};

/// Price analyst, news analyst and writer of one crew
pub struct NewsletterAgents {
    pub price_analyst: Arc<RoleAgent>,
    pub news_analyst: Arc<RoleAgent>,
    pub writer: Arc<RoleAgent>,
}

impl NewsletterAgents {
    /// Build the agents and their tools
    pub fn build(
        runtime: &AgentRuntime,
        prompts: &PromptRegistry,
        config: &NewsletterConfig,
        prices: Arc<dyn PriceSource>,
        search: Arc<dyn NewsSearch>,
    ) -> Result<Self> {
        let price_tool: Arc<dyn Tool> = Arc::new(YahooFinanceTool::new(prices, config.lookback_days));
        let news_tool: Arc<dyn Tool> = Arc::new(NewsSearchTool::new(
            search,
            config.news_results,
            config.companion_symbol.clone(),
        ));

        let price_analyst = AgentRole::new(
            PRICE_ANALYST_ROLE,
            prompts.source(PRICE_ANALYST_GOAL)?,
            prompts.source(PRICE_ANALYST_BACKSTORY)?,
        )
        .max_iter(5)
        .memory(true)
        .allow_delegation(false)
        .verbose(config.verbose);

        let news_analyst = AgentRole::new(
            NEWS_ANALYST_ROLE,
            prompts.source(NEWS_ANALYST_GOAL)?,
            prompts.source(NEWS_ANALYST_BACKSTORY)?,
        )
        .max_iter(10)
        .memory(true)
        .allow_delegation(false)
        .verbose(config.verbose);

        let writer = AgentRole::new(
            WRITER_ROLE,
            prompts.source(WRITER_GOAL)?,
            prompts.source(WRITER_BACKSTORY)?,
        )
        .max_iter(5)
        .memory(true)
        .allow_delegation(true)
        .verbose(config.verbose);

        Ok(Self {
            price_analyst: Arc::new(runtime.role_agent(price_analyst, vec![price_tool])),
            news_analyst: Arc::new(runtime.role_agent(news_analyst, vec![news_tool])),
            writer: Arc::new(runtime.role_agent(writer, Vec::new())),
        })
    }

    /// In crew order
    pub fn all(&self) -> Vec<Arc<RoleAgent>> {
        vec![
            self.price_analyst.clone(),
            self.news_analyst.clone(),
            self.writer.clone(),
        ]
    }
}
