//! Price history table and trend summary handed to the price analyst

use crate::api::DailyPrice;
use crate::error::{NewsletterError, Result};
use std::fmt::Write;
use ta::Next;
use ta::indicators::SimpleMovingAverage;

/// Tables longer than this are shortened to head and tail
const MAX_FULL_ROWS: usize = 60;
const EDGE_ROWS: usize = 5;
const COLUMNS: usize = 6;

/// Daily prices of one symbol, oldest first
#[derive(Debug, Clone)]
pub struct PriceHistory {
    symbol: String,
    rows: Vec<DailyPrice>,
}

/// Headline numbers of a price history
#[derive(Debug, Clone, PartialEq)]
pub struct TrendSummary {
    pub first_close: f64,
    pub last_close: f64,
    pub change_pct: f64,
    pub period_high: f64,
    pub period_low: f64,
    pub sma_20: Option<f64>,
    pub sma_50: Option<f64>,
}

impl PriceHistory {
    /// Wrap fetched rows; an empty series is an error
    pub fn new(symbol: impl Into<String>, mut rows: Vec<DailyPrice>) -> Result<Self> {
        let symbol = symbol.into();
        if rows.is_empty() {
            return Err(NewsletterError::DataUnavailable {
                symbol,
                reason: "no price rows returned".to_string(),
            });
        }
        rows.sort_by_key(|r| r.date);
        Ok(Self { symbol, rows })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn rows(&self) -> &[DailyPrice] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn summary(&self) -> TrendSummary {
        let closes: Vec<f64> = self.rows.iter().map(|r| r.close).collect();
        let first_close = closes.first().copied().unwrap_or_default();
        let last_close = closes.last().copied().unwrap_or_default();
        let change_pct = if first_close == 0.0 {
            0.0
        } else {
            (last_close - first_close) / first_close * 100.0
        };

        TrendSummary {
            first_close,
            last_close,
            change_pct,
            period_high: self.rows.iter().map(|r| r.high).fold(f64::MIN, f64::max),
            period_low: self.rows.iter().map(|r| r.low).fold(f64::MAX, f64::min),
            sma_20: simple_moving_average(&closes, 20),
            sma_50: simple_moving_average(&closes, 50),
        }
    }

    /// Text table, shortened past 60 rows, followed by the row count
    pub fn to_table(&self) -> String {
        let mut out = format!(
            "{:<10} {:>12} {:>12} {:>12} {:>12} {:>12} {:>14}\n",
            "Date", "Open", "High", "Low", "Close", "Adj Close", "Volume"
        );

        if self.rows.len() > MAX_FULL_ROWS {
            for row in &self.rows[..EDGE_ROWS] {
                push_row(&mut out, row);
            }
            out.push_str("...\n");
            for row in &self.rows[self.rows.len() - EDGE_ROWS..] {
                push_row(&mut out, row);
            }
        } else {
            for row in &self.rows {
                push_row(&mut out, row);
            }
        }

        let _ = write!(out, "\n[{} rows x {COLUMNS} columns]", self.rows.len());
        out
    }

    /// Table plus summary, the text the price tool returns
    pub fn render(&self) -> String {
        let first = &self.rows[0].date;
        let last = &self.rows[self.rows.len() - 1].date;
        let summary = self.summary();

        let mut out = format!(
            "{} daily prices from {} to {}\n\n",
            self.symbol,
            first.format("%Y-%m-%d"),
            last.format("%Y-%m-%d")
        );
        out.push_str(&self.to_table());
        out.push_str("\n\nSummary:\n");
        let _ = writeln!(out, "- First close: {:.2}", summary.first_close);
        let _ = writeln!(out, "- Last close: {:.2}", summary.last_close);
        let _ = writeln!(out, "- Change: {:+.2}%", summary.change_pct);
        let _ = writeln!(out, "- Period high: {:.2}", summary.period_high);
        let _ = writeln!(out, "- Period low: {:.2}", summary.period_low);
        if let Some(sma) = summary.sma_20 {
            let _ = writeln!(out, "- 20-day SMA: {sma:.2}");
        }
        if let Some(sma) = summary.sma_50 {
            let _ = writeln!(out, "- 50-day SMA: {sma:.2}");
        }
        out.trim_end().to_string()
    }
}

fn push_row(out: &mut String, row: &DailyPrice) {
    let _ = writeln!(
        out,
        "{:<10} {:>12.6} {:>12.6} {:>12.6} {:>12.6} {:>12.6} {:>14}",
        row.date.format("%Y-%m-%d"),
        row.open,
        row.high,
        row.low,
        row.close,
        row.adj_close,
        row.volume
    );
}

/// Last value of the moving average, `None` with fewer than `period` closes
fn simple_moving_average(closes: &[f64], period: usize) -> Option<f64> {
    if closes.len() < period {
        return None;
    }
    let mut sma = SimpleMovingAverage::new(period).ok()?;
    closes.iter().fold(None, |_, &close| Some(sma.next(close)))
}
