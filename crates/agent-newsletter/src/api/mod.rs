//! Market data and news clients

pub mod duckduckgo;
pub mod yahoo;

pub use duckduckgo::{DuckDuckGoClient, NewsResult, NewsSearch};
pub use yahoo::{DailyPrice, PriceSource, YahooFinanceClient};
