//! Tool fetching one year of daily prices

use agent_core::Result as AgentResult;
use agent_llm::tools::schema;
use agent_tools::Tool;
use async_trait::async_trait;
use chrono::{Duration, Local, NaiveDate};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::api::PriceSource;
use crate::error::Result;
use crate::history::PriceHistory;
use crate::ticker::Ticker;

pub const PRICE_TOOL_NAME: &str = "yahoo_finance";

const DESCRIPTION: &str = "Fetches stocks prices for {ticker} from the last year about a specific stock from Yahoo Finance API";

/// Price history tool backed by a [`PriceSource`]
pub struct YahooFinanceTool {
    source: Arc<dyn PriceSource>,
    lookback_days: i64,
}

#[derive(Debug, Deserialize)]
struct PriceParams {
    ticker: String,
}

impl YahooFinanceTool {
    pub fn new(source: Arc<dyn PriceSource>, lookback_days: i64) -> Self {
        Self {
            source,
            lookback_days,
        }
    }

    /// Start and end of the window ending on `today`
    pub fn window(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        (today - Duration::days(self.lookback_days), today)
    }

    /// Fetch the history of `ticker` up to `today`
    #[instrument(skip(self), fields(ticker = %ticker))]
    pub async fn fetch(&self, ticker: &Ticker, today: NaiveDate) -> Result<PriceHistory> {
        let (start, end) = self.window(today);
        let rows = self
            .source
            .daily_history(ticker.as_str(), start, end)
            .await?;
        info!(rows = rows.len(), %start, %end, "Fetched price history");
        PriceHistory::new(ticker.as_str(), rows)
    }
}

#[async_trait]
impl Tool for YahooFinanceTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: PriceParams = serde_json::from_value(params)
            .map_err(|e| agent_core::Error::tool(PRICE_TOOL_NAME, format!("invalid arguments: {e}")))?;
        let ticker = Ticker::parse(&params.ticker)
            .map_err(|e| agent_core::Error::tool(PRICE_TOOL_NAME, e.to_string()))?;

        let history = self
            .fetch(&ticker, Local::now().date_naive())
            .await
            .map_err(|e| agent_core::Error::tool(PRICE_TOOL_NAME, e.to_string()))?;

        Ok(Value::String(history.render()))
    }

    fn name(&self) -> &str {
        PRICE_TOOL_NAME
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({ "ticker": schema::string("Stock ticker symbol, e.g. AAPL") }),
            &["ticker"],
        )
    }
}
