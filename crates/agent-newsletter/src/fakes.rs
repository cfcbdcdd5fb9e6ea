//! In-memory data sources for tests

use crate::api::{DailyPrice, NewsResult, NewsSearch, PriceSource};
use crate::error::{NewsletterError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Mutex;

/// Price source returning fixed rows and recording each request
#[derive(Default)]
pub struct FakePrices {
    pub rows: Vec<DailyPrice>,
    pub fail: bool,
    pub calls: Mutex<Vec<(String, NaiveDate, NaiveDate)>>,
}

impl FakePrices {
    /// `count` consecutive days of rising closes
    pub fn rising(count: usize) -> Self {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let rows = (0..count)
            .map(|i| {
                let close = 50.0 + i as f64;
                DailyPrice {
                    date: start + chrono::Duration::days(i as i64),
                    open: close,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    adj_close: close,
                    volume: 10_000,
                }
            })
            .collect();
        Self {
            rows,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<(String, NaiveDate, NaiveDate)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PriceSource for FakePrices {
    async fn daily_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyPrice>> {
        self.calls
            .lock()
            .unwrap()
            .push((symbol.to_string(), start, end));
        if self.fail {
            return Err(NewsletterError::YahooFinance("service down".to_string()));
        }
        Ok(self.rows.clone())
    }
}

/// Search backend answering every query with `per_query` generated hits
#[derive(Default)]
pub struct FakeSearch {
    pub per_query: usize,
    pub queries: Mutex<Vec<(String, usize)>>,
}

impl FakeSearch {
    pub fn new(per_query: usize) -> Self {
        Self {
            per_query,
            ..Self::default()
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries
            .lock()
            .unwrap()
            .iter()
            .map(|(q, _)| q.clone())
            .collect()
    }
}

#[async_trait]
impl NewsSearch for FakeSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<NewsResult>> {
        self.queries
            .lock()
            .unwrap()
            .push((query.to_string(), max_results));
        Ok((0..self.per_query.min(max_results))
            .map(|i| NewsResult {
                title: format!("{query} headline {i}"),
                snippet: format!("{query} moved today"),
                link: format!("https://news.example/{i}"),
                date: Some("2024-05-01T00:00:00+00:00".to_string()),
                source: Some("Example Wire".to_string()),
            })
            .collect())
    }
}
