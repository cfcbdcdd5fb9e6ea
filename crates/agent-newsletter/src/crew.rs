//! The newsletter crew: three agents, three tasks, one manager

use agent_llm::providers::{OpenAIConfig, OpenAIProvider};
use agent_prompt::PromptRegistry;
use agent_runtime::{AgentRuntime, LlmSettings};
use agent_utils::SecretStore;
use agent_workflow::{Crew, Task};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::agents::NewsletterAgents;
use crate::api::{DuckDuckGoClient, NewsSearch, PriceSource, YahooFinanceClient};
use crate::config::NewsletterConfig;
use crate::error::Result;
use crate::newsletter::Newsletter;
use crate::prompts::{
    self, GET_NEWS, GET_NEWS_DESCRIPTION, GET_NEWS_EXPECTED, GET_STOCK_PRICE,
    GET_STOCK_PRICE_DESCRIPTION, GET_STOCK_PRICE_EXPECTED, NEWS_ANALYST_ROLE, PRICE_ANALYST_ROLE,
    WRITE_ANALYSIS, WRITE_ANALYSIS_DESCRIPTION, WRITE_ANALYSIS_EXPECTED, WRITER_ROLE,
};
use crate::ticker::Ticker;

/// Timeout of one chat completion
const LLM_TIMEOUT_SECS: u64 = 180;

/// Anything that turns a ticker into a newsletter
#[async_trait]
pub trait Research: Send + Sync {
    async fn research(&self, ticker: &Ticker) -> Result<Newsletter>;
}

/// Crew producing a stock newsletter
pub struct NewsletterCrew {
    crew: Crew,
    config: NewsletterConfig,
}

impl NewsletterCrew {
    /// Assemble agents, tasks and manager
    ///
    /// # Arguments
    /// * `runtime` - Provider and default model settings for the agents
    /// * `config` - Crew limits, tool settings and process
    /// * `prices` - Source of the price history tool
    /// * `search` - Backend of the news search tool
    pub fn new(
        runtime: &AgentRuntime,
        config: NewsletterConfig,
        prices: Arc<dyn PriceSource>,
        search: Arc<dyn NewsSearch>,
    ) -> Result<Self> {
        config.validate()?;
        let prompts = prompts::registry()?;
        let agents = NewsletterAgents::build(runtime, &prompts, &config, prices, search)?;

        let manager_llm = LlmSettings {
            model: config.manager_model().to_string(),
            ..runtime.llm().clone()
        };
        let manager = runtime.role_agent_with(
            Crew::manager_role(config.crew_max_iter).verbose(config.verbose),
            manager_llm,
            Vec::new(),
        );

        let crew = Crew::builder()
            .agents(agents.all())
            .tasks(tasks(&prompts)?)
            .process(config.process)
            .manager(Arc::new(manager))
            .verbose(config.verbose)
            .build()?;

        Ok(Self { crew, config })
    }

    /// Crew on the OpenAI-compatible API, Yahoo Finance and DuckDuckGo
    ///
    /// Reads `OPENAI_API_KEY` (and `OPENAI_API_BASE` when set) from `secrets`.
    pub fn connect(secrets: &SecretStore, config: NewsletterConfig) -> Result<Self> {
        config.validate()?;
        let provider = OpenAIProvider::with_config(
            OpenAIConfig::from_secrets(secrets)?.with_timeout(LLM_TIMEOUT_SECS),
        )?;
        let runtime = AgentRuntime::builder()
            .provider(Arc::new(provider))
            .model(config.model.clone())
            .temperature(config.temperature)
            .max_tokens(config.max_tokens)
            .build()?;

        let search = DuckDuckGoClient::new(
            config.search_backend,
            config.search_rate_per_minute,
            config.request_timeout,
        )?;
        info!(
            model = %config.model,
            manager_model = config.manager_model(),
            backend = ?config.search_backend,
            "Connecting newsletter crew"
        );

        Self::new(
            &runtime,
            config,
            Arc::new(YahooFinanceClient::new()),
            Arc::new(search),
        )
    }

    pub fn crew(&self) -> &Crew {
        &self.crew
    }

    pub fn config(&self) -> &NewsletterConfig {
        &self.config
    }

    /// Run the crew for one ticker
    #[instrument(skip(self), fields(ticker = %ticker, process = ?self.config.process))]
    pub async fn run(&self, ticker: &Ticker) -> Result<Newsletter> {
        info!("Starting newsletter research");
        let output = self.crew.kickoff([("ticker", ticker.as_str())]).await?;

        let newsletter = Newsletter::from_crew_output(ticker.clone(), output);
        if !newsletter.sections.is_complete() {
            let missing: Vec<String> = newsletter
                .sections
                .missing()
                .iter()
                .map(ToString::to_string)
                .collect();
            warn!(
                missing = ?missing,
                in_order = newsletter.sections.in_order(),
                "Newsletter does not follow the requested layout"
            );
        }
        info!(
            total_tokens = newsletter.token_usage.total(),
            chars = newsletter.markdown.len(),
            "Newsletter ready"
        );
        Ok(newsletter)
    }
}

#[async_trait]
impl Research for NewsletterCrew {
    async fn research(&self, ticker: &Ticker) -> Result<Newsletter> {
        self.run(ticker).await
    }
}

fn tasks(prompts: &PromptRegistry) -> Result<Vec<Task>> {
    Ok(vec![
        Task::new(
            GET_STOCK_PRICE,
            prompts.source(GET_STOCK_PRICE_DESCRIPTION)?,
            prompts.source(GET_STOCK_PRICE_EXPECTED)?,
        )
        .agent(PRICE_ANALYST_ROLE),
        Task::new(
            GET_NEWS,
            prompts.source(GET_NEWS_DESCRIPTION)?,
            prompts.source(GET_NEWS_EXPECTED)?,
        )
        .agent(NEWS_ANALYST_ROLE),
        Task::new(
            WRITE_ANALYSIS,
            prompts.source(WRITE_ANALYSIS_DESCRIPTION)?,
            prompts.source(WRITE_ANALYSIS_EXPECTED)?,
        )
        .agent(WRITER_ROLE)
        .context([GET_STOCK_PRICE, GET_NEWS]),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{FakePrices, FakeSearch};
    use agent_workflow::Process;
    use agent_runtime::testing::{ScriptedProvider, tool_call};
    use serde_json::json;

    const NEWSLETTER: &str = "## Executive Summary\n- up\n- calm\n- 60\n\n## Introduction\nintro\n\n\
                              ## Main Analysis\nbody\n\n## Summary\nup";

    fn runtime(provider: Arc<ScriptedProvider>) -> AgentRuntime {
        AgentRuntime::builder().provider(provider).build().unwrap()
    }

    #[test]
    fn test_crew_layout() {
        let provider = Arc::new(ScriptedProvider::new(Vec::new()));
        let crew = NewsletterCrew::new(
            &runtime(provider),
            NewsletterConfig::default(),
            Arc::new(FakePrices::default()),
            Arc::new(FakeSearch::default()),
        )
        .unwrap();

        let inner = crew.crew();
        assert_eq!(inner.process(), Process::Hierarchical);
        assert_eq!(inner.agents().len(), 3);

        let names: Vec<&str> = inner.tasks().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["get_stock_price", "get_news", "write_analysis"]);
        assert_eq!(inner.tasks()[2].context, vec!["get_stock_price", "get_news"]);

        let manager = inner.manager().unwrap().spec();
        assert_eq!(manager.max_iter, 15);
        assert!(manager.allow_delegation);
    }

    #[tokio::test]
    async fn test_sequential_run_uses_both_tools() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            tool_call("c1", "yahoo_finance", json!({ "ticker": "AAPL" })),
            ScriptedProvider::text("AAPL, up"),
            tool_call("c2", "duckduckgo_news_search", json!({ "query": "AAPL" })),
            ScriptedProvider::text("AAPL: greed 70. BTC: fear 40."),
            ScriptedProvider::text(NEWSLETTER),
        ]));
        let prices = Arc::new(FakePrices::rising(300));
        let search = Arc::new(FakeSearch::new(2));
        let config = NewsletterConfig::builder()
            .process(Process::Sequential)
            .verbose(false)
            .build()
            .unwrap();

        let crew =
            NewsletterCrew::new(&runtime(provider.clone()), config, prices.clone(), search.clone())
                .unwrap();
        let newsletter = crew.run(&Ticker::parse("aapl").unwrap()).await.unwrap();

        assert_eq!(newsletter.markdown, NEWSLETTER);
        assert!(newsletter.sections.is_complete());
        assert_eq!(newsletter.tasks.len(), 3);
        assert_eq!(newsletter.token_usage.total(), 75);

        assert_eq!(prices.calls().len(), 1);
        assert_eq!(search.queries(), vec!["AAPL", "BTC"]);
        assert_eq!(provider.remaining(), 0);

        // the writer sees both earlier outputs
        let writer_request = &provider.requests()[4];
        let prompt = writer_request.messages[0].text().unwrap();
        assert!(prompt.contains("newsletter about the AAPL company"));
        assert!(prompt.contains("AAPL, up"));
        assert!(prompt.contains("BTC: fear 40."));
    }

    #[tokio::test]
    async fn test_hierarchical_manager_delegates() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            // get_stock_price: manager delegates to the price analyst
            tool_call(
                "m1",
                "delegate_work_to_coworker",
                json!({
                    "task": "Analyze AAPL prices",
                    "context": "one year of history",
                    "coworker": "Senior Stock Price Analyst"
                }),
            ),
            ScriptedProvider::text("AAPL trend: up"),
            ScriptedProvider::text("AAPL trend: up"),
            // get_news: manager answers directly
            ScriptedProvider::text("AAPL greed 70, BTC fear 40"),
            // write_analysis
            ScriptedProvider::text(NEWSLETTER),
        ]));

        let crew = NewsletterCrew::new(
            &runtime(provider.clone()),
            NewsletterConfig::default(),
            Arc::new(FakePrices::default()),
            Arc::new(FakeSearch::default()),
        )
        .unwrap();
        let newsletter = crew.research(&Ticker::parse("AAPL").unwrap()).await.unwrap();

        assert_eq!(newsletter.tasks[0].raw, "AAPL trend: up");
        assert_eq!(newsletter.tasks[0].agent, "Crew Manager");
        assert!(newsletter.sections.is_complete());
        assert_eq!(provider.remaining(), 0);

        // the manager is offered the delegation tools
        let tools: Vec<String> = provider.requests()[0]
            .tools
            .iter()
            .map(|t| t.name.clone())
            .collect();
        assert!(tools.contains(&"delegate_work_to_coworker".to_string()));
        assert!(tools.contains(&"ask_question_to_coworker".to_string()));
    }

    #[test]
    fn test_connect_requires_api_key() {
        let err = NewsletterCrew::connect(&SecretStore::new(), NewsletterConfig::default())
            .err()
            .unwrap();
        assert!(err.to_string().contains("OPENAI_API_KEY"));

        let mut secrets = SecretStore::new();
        secrets.overlay([("OPENAI_API_KEY", "sk-test")]);
        let crew = NewsletterCrew::connect(&secrets, NewsletterConfig::default()).unwrap();
        assert_eq!(crew.config().model, "gpt-3.5-turbo");
    }

    #[tokio::test]
    async fn test_agent_failure_propagates() {
        // no scripted responses: the first LLM call fails
        let provider = Arc::new(ScriptedProvider::new(Vec::new()));
        let crew = NewsletterCrew::new(
            &runtime(provider),
            NewsletterConfig::default(),
            Arc::new(FakePrices::default()),
            Arc::new(FakeSearch::default()),
        )
        .unwrap();

        assert!(crew.run(&Ticker::parse("AAPL").unwrap()).await.is_err());
    }
}
