//! Tools the newsletter agents call

pub mod news_search;
pub mod price_history;

pub use news_search::{NEWS_TOOL_NAME, NewsSearchTool, ensure_companion_symbol};
pub use price_history::{PRICE_TOOL_NAME, YahooFinanceTool};
