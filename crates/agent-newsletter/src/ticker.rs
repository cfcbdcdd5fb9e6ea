//! Ticker symbol input

use crate::error::{NewsletterError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const MAX_TICKER_LEN: usize = 15;

/// A validated, upper-cased ticker symbol
///
/// Letters, digits and the punctuation Yahoo uses in symbols
/// (`BRK-B`, `^GSPC`, `EURUSD=X`, `VOD.L`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    pub fn parse(input: &str) -> Result<Self> {
        let symbol = input.trim();
        if symbol.is_empty() {
            return Err(NewsletterError::EmptyTicker);
        }
        let valid = symbol.len() <= MAX_TICKER_LEN
            && symbol
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='));
        if !valid {
            return Err(NewsletterError::InvalidTicker(symbol.to_string()));
        }
        Ok(Self(symbol.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Ticker {
    type Err = NewsletterError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Ticker {
    type Error = NewsletterError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Ticker> for String {
    fn from(ticker: Ticker) -> Self {
        ticker.0
    }
}

impl AsRef<str> for Ticker {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
