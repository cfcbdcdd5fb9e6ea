//! Yahoo Finance price history

use crate::error::{NewsletterError, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{debug, instrument};
use yahoo_finance_api as yahoo;

/// One trading day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPrice {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adj_close: f64,
    pub volume: u64,
}

/// Source of daily price history
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Daily rows from `start` up to `end`, oldest first
    async fn daily_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyPrice>>;
}

/// Yahoo Finance API client
#[derive(Debug, Clone, Default)]
pub struct YahooFinanceClient {}

impl YahooFinanceClient {
    pub fn new() -> Self {
        Self {}
    }
}

fn to_offset(date: NaiveDate) -> Result<OffsetDateTime> {
    let timestamp = date.and_time(NaiveTime::MIN).and_utc().timestamp();
    OffsetDateTime::from_unix_timestamp(timestamp)
        .map_err(|e| NewsletterError::YahooFinance(format!("Invalid timestamp for {date}: {e}")))
}

#[async_trait]
impl PriceSource for YahooFinanceClient {
    #[instrument(skip(self))]
    async fn daily_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyPrice>> {
        let provider = yahoo::YahooConnector::new()
            .map_err(|e| NewsletterError::YahooFinance(e.to_string()))?;

        let response = provider
            .get_quote_history(symbol, to_offset(start)?, to_offset(end)?)
            .await
            .map_err(|e| NewsletterError::YahooFinance(e.to_string()))?;

        let quotes = response
            .quotes()
            .map_err(|e| NewsletterError::YahooFinance(e.to_string()))?;
        debug!(rows = quotes.len(), "Price history received");

        Ok(quotes
            .iter()
            .filter_map(|q| {
                let date = DateTime::from_timestamp(q.timestamp as i64, 0)?.date_naive();
                Some(DailyPrice {
                    date,
                    open: q.open,
                    high: q.high,
                    low: q.low,
                    close: q.close,
                    adj_close: q.adjclose,
                    volume: q.volume,
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_offset_is_midnight_utc() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let offset = to_offset(date).unwrap();
        assert_eq!(offset.unix_timestamp(), 1_714_521_600);
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_daily_history_live() {
        let client = YahooFinanceClient::new();
        let end = chrono::Local::now().date_naive();
        let start = end - chrono::Duration::days(365);

        let rows = client.daily_history("AAPL", start, end).await.unwrap();
        assert!(rows.len() > 200);
        assert!(rows.windows(2).all(|w| w[0].date <= w[1].date));
    }
}
