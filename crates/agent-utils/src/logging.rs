//! Logging and tracing utilities

use tracing_subscriber::{
    EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError,
};

/// Options for the global subscriber
#[derive(Debug, Clone)]
pub struct LoggingOptions {
    /// Filter used when `RUST_LOG` is not set
    pub default_filter: String,
    /// Emit JSON lines instead of the human readable format
    pub json: bool,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            default_filter: "info".to_string(),
            json: false,
        }
    }
}

impl LoggingOptions {
    /// Options with a custom default filter
    pub fn with_filter(filter: impl Into<String>) -> Self {
        Self {
            default_filter: filter.into(),
            ..Self::default()
        }
    }

    /// Switch JSON output on or off
    pub fn json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.default_filter))
    }
}

/// Initialize tracing subscriber with default configuration
pub fn init_tracing() {
    // A second initialisation is a no-op.
    let _ = init_tracing_with(&LoggingOptions::default());
}

/// Initialize tracing subscriber with the given options
///
/// Fails when a global subscriber is already installed.
pub fn init_tracing_with(options: &LoggingOptions) -> Result<(), TryInitError> {
    let json_layer = options.json.then(|| fmt::layer().json().with_target(true));
    let text_layer = (!options.json).then(|| fmt::layer().with_target(true));

    tracing_subscriber::registry()
        .with(options.env_filter())
        .with(json_layer)
        .with(text_layer)
        .try_init()
}
