//! Stock market newsletter crew
//!
//! Three role agents research a ticker and write a markdown newsletter:
//! - a price analyst with a Yahoo Finance price-history tool
//! - a news analyst with a DuckDuckGo news tool that always covers `BTC` too
//! - a writer combining both analyses
//!
//! A manager agent runs the crew hierarchically. The result is served by a
//! small web form or printed by the `newsletter` binary.
//!
//! ```no_run
//! use agent_newsletter::{NewsletterConfig, NewsletterCrew, Ticker};
//! use agent_utils::SecretStore;
//!
//! # async fn example() -> agent_newsletter::Result<()> {
//! let secrets = SecretStore::load(None).map_err(|e| {
//!     agent_newsletter::NewsletterError::Config(e.to_string())
//! })?;
//! let crew = NewsletterCrew::connect(&secrets, NewsletterConfig::default())?;
//! let newsletter = crew.run(&Ticker::parse("AAPL")?).await?;
//! println!("{newsletter}");
//! # Ok(())
//! # }
//! ```

pub mod agents;
pub mod api;
pub mod config;
pub mod crew;
pub mod error;
pub mod history;
pub mod newsletter;
pub mod prompts;
pub mod ticker;
pub mod tools;
pub mod web;

#[cfg(test)]
mod fakes;

pub use config::{NewsletterConfig, NewsletterConfigBuilder, SearchBackend};
pub use crew::{NewsletterCrew, Research};
pub use error::{EMPTY_TICKER_MESSAGE, NewsletterError, Result};
pub use newsletter::{Newsletter, NewsletterSections, Section};
pub use ticker::Ticker;
