//! News search tool with a companion symbol that is always searched

use agent_core::Result as AgentResult;
use agent_llm::tools::schema;
use agent_tools::Tool;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, info};

use crate::api::{NewsResult, NewsSearch};

pub const NEWS_TOOL_NAME: &str = "duckduckgo_news_search";

pub const NO_RESULTS: &str = "No good DuckDuckGo Search Result was found";

const DESCRIPTION: &str = "A wrapper around Duck Duck Go Search. Useful for when you need to answer questions about current events. Input should be a search query. Output is a list of recent news articles with snippet, title, link, date and source.";

/// News search tool backed by a [`NewsSearch`]
pub struct NewsSearchTool {
    search: Arc<dyn NewsSearch>,
    max_results: usize,
    companion_symbol: String,
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    query: String,
}

impl NewsSearchTool {
    pub fn new(
        search: Arc<dyn NewsSearch>,
        max_results: usize,
        companion_symbol: impl Into<String>,
    ) -> Self {
        Self {
            search,
            max_results,
            companion_symbol: companion_symbol.into(),
        }
    }

    pub fn companion_symbol(&self) -> &str {
        &self.companion_symbol
    }

    /// Run every query and format one section per query
    pub async fn search_all(&self, query: &str) -> crate::error::Result<String> {
        let queries = ensure_companion_symbol(query, &self.companion_symbol);
        if queries.len() > 1 {
            debug!(companion = %self.companion_symbol, "Adding companion symbol search");
        }

        let mut sections = Vec::with_capacity(queries.len());
        for q in &queries {
            let results = self.search.search(q, self.max_results).await?;
            info!(query = %q, results = results.len(), "News search");
            sections.push(format!("Results for {q}:\n{}", format_results(&results)));
        }
        Ok(sections.join("\n\n"))
    }
}

/// The query itself, plus `companion` when the query does not mention it
pub fn ensure_companion_symbol(query: &str, companion: &str) -> Vec<String> {
    let query = query.trim().to_string();
    let companion = companion.trim();
    if companion.is_empty() {
        return vec![query];
    }

    let mentioned = query
        .split(|c: char| !c.is_ascii_alphanumeric())
        .any(|word| word.eq_ignore_ascii_case(companion));
    if mentioned {
        vec![query]
    } else {
        vec![query, companion.to_string()]
    }
}

fn format_results(results: &[NewsResult]) -> String {
    if results.is_empty() {
        return NO_RESULTS.to_string();
    }
    results
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[async_trait]
impl Tool for NewsSearchTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: SearchParams = serde_json::from_value(params)
            .map_err(|e| agent_core::Error::tool(NEWS_TOOL_NAME, format!("invalid arguments: {e}")))?;
        if params.query.trim().is_empty() {
            return Err(agent_core::Error::tool(NEWS_TOOL_NAME, "query must not be empty"));
        }

        let text = self
            .search_all(&params.query)
            .await
            .map_err(|e| agent_core::Error::tool(NEWS_TOOL_NAME, e.to_string()))?;
        Ok(Value::String(text))
    }

    fn name(&self) -> &str {
        NEWS_TOOL_NAME
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({ "query": schema::string("Search query, e.g. a ticker symbol") }),
            &["query"],
        )
    }
}
