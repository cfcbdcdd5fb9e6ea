//! Configuration for the newsletter crew

use crate::error::{NewsletterError, Result};
use agent_utils::SecretStore;
use agent_workflow::Process;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

/// Secret overriding the chat model
pub const MODEL_SECRET: &str = "OPENAI_MODEL";

/// DuckDuckGo endpoint used for news searches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchBackend {
    /// News JSON endpoint, results carry date and source
    #[default]
    News,
    /// Plain HTML results page
    Html,
}

impl FromStr for SearchBackend {
    type Err = NewsletterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "news" => Ok(Self::News),
            "html" => Ok(Self::Html),
            other => Err(NewsletterError::Config(format!(
                "unknown search backend '{other}', expected 'news' or 'html'"
            ))),
        }
    }
}

/// Configuration for the newsletter crew
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsletterConfig {
    /// Chat model used by the three agents
    pub model: String,

    /// Chat model of the crew manager, `model` when unset
    pub manager_model: Option<String>,

    pub temperature: Option<f32>,

    pub max_tokens: usize,

    /// Iteration cap of the crew manager
    pub crew_max_iter: usize,

    /// Results per news search
    pub news_results: usize,

    /// Symbol whose news is always fetched next to the requested ticker
    pub companion_symbol: String,

    /// Length of the price history, ending today
    pub lookback_days: i64,

    pub search_backend: SearchBackend,

    pub process: Process,

    /// Address of the web UI
    pub bind_addr: SocketAddr,

    /// Timeout for data API requests
    pub request_timeout: Duration,

    /// News searches allowed per minute
    pub search_rate_per_minute: u32,

    /// Log every agent step at info level
    pub verbose: bool,
}

impl Default for NewsletterConfig {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".to_string(),
            manager_model: None,
            temperature: Some(0.7),
            max_tokens: 2048,
            crew_max_iter: 15,
            news_results: 10,
            companion_symbol: "BTC".to_string(),
            lookback_days: 365,
            search_backend: SearchBackend::News,
            process: Process::Hierarchical,
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8501)),
            request_timeout: Duration::from_secs(30),
            search_rate_per_minute: 20,
            verbose: true,
        }
    }
}

impl NewsletterConfig {
    /// Create a new configuration builder
    pub fn builder() -> NewsletterConfigBuilder {
        NewsletterConfigBuilder::default()
    }

    /// Model used by the crew manager
    pub fn manager_model(&self) -> &str {
        self.manager_model.as_deref().unwrap_or(&self.model)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(NewsletterError::Config("model must not be empty".to_string()));
        }
        if self.crew_max_iter == 0 {
            return Err(NewsletterError::Config(
                "crew_max_iter must be greater than 0".to_string(),
            ));
        }
        if self.news_results == 0 {
            return Err(NewsletterError::Config(
                "news_results must be greater than 0".to_string(),
            ));
        }
        if self.lookback_days <= 0 {
            return Err(NewsletterError::Config(
                "lookback_days must be greater than 0".to_string(),
            ));
        }
        if self.search_rate_per_minute == 0 {
            return Err(NewsletterError::Config(
                "search_rate_per_minute must be greater than 0".to_string(),
            ));
        }
        if self.companion_symbol.trim().is_empty() {
            return Err(NewsletterError::Config(
                "companion_symbol must not be empty".to_string(),
            ));
        }
        if let Some(t) = self.temperature.filter(|t| !(0.0..=2.0).contains(t)) {
            return Err(NewsletterError::Config(format!(
                "temperature {t} is outside 0.0..=2.0"
            )));
        }
        Ok(())
    }
}

/// Builder for NewsletterConfig
#[derive(Debug, Default)]
pub struct NewsletterConfigBuilder {
    model: Option<String>,
    manager_model: Option<String>,
    temperature: Option<Option<f32>>,
    max_tokens: Option<usize>,
    crew_max_iter: Option<usize>,
    news_results: Option<usize>,
    companion_symbol: Option<String>,
    lookback_days: Option<i64>,
    search_backend: Option<SearchBackend>,
    process: Option<Process>,
    bind_addr: Option<SocketAddr>,
    request_timeout: Option<Duration>,
    search_rate_per_minute: Option<u32>,
    verbose: Option<bool>,
}

impl NewsletterConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn manager_model(mut self, model: impl Into<String>) -> Self {
        self.manager_model = Some(model.into());
        self
    }

    pub fn temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn crew_max_iter(mut self, max_iter: usize) -> Self {
        self.crew_max_iter = Some(max_iter);
        self
    }

    pub fn news_results(mut self, count: usize) -> Self {
        self.news_results = Some(count);
        self
    }

    pub fn companion_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.companion_symbol = Some(symbol.into());
        self
    }

    pub fn lookback_days(mut self, days: i64) -> Self {
        self.lookback_days = Some(days);
        self
    }

    pub fn search_backend(mut self, backend: SearchBackend) -> Self {
        self.search_backend = Some(backend);
        self
    }

    pub fn process(mut self, process: Process) -> Self {
        self.process = Some(process);
        self
    }

    pub fn bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = Some(addr);
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn search_rate_per_minute(mut self, rate: u32) -> Self {
        self.search_rate_per_minute = Some(rate);
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = Some(verbose);
        self
    }

    /// Take the model from the secrets store when it is set there
    pub fn with_secrets(mut self, secrets: &SecretStore) -> Self {
        if self.model.is_none() {
            self.model = secrets.get(MODEL_SECRET).map(str::to_string);
        }
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<NewsletterConfig> {
        let defaults = NewsletterConfig::default();

        let config = NewsletterConfig {
            model: self.model.unwrap_or(defaults.model),
            manager_model: self.manager_model.or(defaults.manager_model),
            temperature: self.temperature.unwrap_or(defaults.temperature),
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            crew_max_iter: self.crew_max_iter.unwrap_or(defaults.crew_max_iter),
            news_results: self.news_results.unwrap_or(defaults.news_results),
            companion_symbol: self
                .companion_symbol
                .map(|s| s.trim().to_ascii_uppercase())
                .unwrap_or(defaults.companion_symbol),
            lookback_days: self.lookback_days.unwrap_or(defaults.lookback_days),
            search_backend: self.search_backend.unwrap_or(defaults.search_backend),
            process: self.process.unwrap_or(defaults.process),
            bind_addr: self.bind_addr.unwrap_or(defaults.bind_addr),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            search_rate_per_minute: self
                .search_rate_per_minute
                .unwrap_or(defaults.search_rate_per_minute),
            verbose: self.verbose.unwrap_or(defaults.verbose),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = NewsletterConfig::default();
        assert_eq!(config.model, "gpt-3.5-turbo");
        assert_eq!(config.crew_max_iter, 15);
        assert_eq!(config.news_results, 10);
        assert_eq!(config.companion_symbol, "BTC");
        assert_eq!(config.lookback_days, 365);
        assert_eq!(config.search_backend, SearchBackend::News);
        assert_eq!(config.process, Process::Hierarchical);
        assert_eq!(config.manager_model(), "gpt-3.5-turbo");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = NewsletterConfig::builder()
            .model("gpt-4o-mini")
            .manager_model("gpt-4o")
            .companion_symbol(" eth ")
            .process(Process::Sequential)
            .request_timeout(Duration::from_secs(5))
            .build()
            .unwrap();

        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.manager_model(), "gpt-4o");
        assert_eq!(config.companion_symbol, "ETH");
        assert_eq!(config.process, Process::Sequential);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_validation() {
        assert!(NewsletterConfig::builder().crew_max_iter(0).build().is_err());
        assert!(NewsletterConfig::builder().news_results(0).build().is_err());
        assert!(NewsletterConfig::builder().lookback_days(0).build().is_err());
        assert!(NewsletterConfig::builder().model(" ").build().is_err());
        assert!(
            NewsletterConfig::builder()
                .temperature(Some(3.5))
                .build()
                .is_err()
        );
        assert!(
            NewsletterConfig::builder()
                .temperature(None)
                .build()
                .is_ok()
        );
    }

    #[test]
    fn test_model_from_secrets() {
        let mut secrets = SecretStore::new();
        secrets.overlay([(MODEL_SECRET, "gpt-4o-mini")]);

        let config = NewsletterConfig::builder()
            .with_secrets(&secrets)
            .build()
            .unwrap();
        assert_eq!(config.model, "gpt-4o-mini");

        let explicit = NewsletterConfig::builder()
            .model("gpt-4o")
            .with_secrets(&secrets)
            .build()
            .unwrap();
        assert_eq!(explicit.model, "gpt-4o");
    }

    #[test]
    fn test_search_backend_from_str() {
        assert_eq!("News".parse::<SearchBackend>().unwrap(), SearchBackend::News);
        assert_eq!("html".parse::<SearchBackend>().unwrap(), SearchBackend::Html);
        assert!("lite".parse::<SearchBackend>().is_err());
    }
}
