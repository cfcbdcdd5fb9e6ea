//! Secrets loading
//!
//! Credentials live in a small TOML file (the same flat layout a
//! `secrets.toml` uses). Environment variables, including those from a
//! `.env` file, take precedence over the file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Default secrets file looked up in the working directory
pub const DEFAULT_SECRETS_FILE: &str = ".secrets.toml";

/// Errors raised while loading secrets
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read secrets file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid secrets file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("missing secret: {0}")]
    Missing(String),
}

/// Flat key/value view over the secrets file and the environment
#[derive(Debug, Clone, Default)]
pub struct SecretStore {
    values: HashMap<String, String>,
}

impl SecretStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the secrets file (if present) and overlay the process environment
    ///
    /// An explicit `path` must exist. Without one, [`DEFAULT_SECRETS_FILE`] is
    /// read when it exists and skipped otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        // A missing .env is fine.
        let _ = dotenvy::dotenv();

        let mut store = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default = Path::new(DEFAULT_SECRETS_FILE);
                if default.exists() {
                    Self::from_file(default)?
                } else {
                    Self::new()
                }
            }
        };
        store.overlay(std::env::vars());
        tracing::debug!(keys = store.values.len(), "Secrets loaded");
        Ok(store)
    }

    /// Read a TOML secrets file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Parse TOML text; nested tables become dotted keys
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let table: toml::Table = raw.parse()?;
        let mut store = Self::new();
        flatten_into(&mut store.values, "", &table);
        Ok(store)
    }

    /// Override values with the given pairs
    pub fn overlay<I, K, V>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in pairs {
            self.values.insert(key.into(), value.into());
        }
    }

    /// Look up a value; blank values count as absent
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// Look up a value that must be present
    pub fn require(&self, key: &str) -> Result<&str, ConfigError> {
        self.get(key)
            .ok_or_else(|| ConfigError::Missing(key.to_string()))
    }
}

fn flatten_into(out: &mut HashMap<String, String>, prefix: &str, table: &toml::Table) {
    for (key, value) in table {
        let full_key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            toml::Value::Table(inner) => flatten_into(out, &full_key, inner),
            toml::Value::String(s) => {
                out.insert(full_key, s.clone());
            }
            other => {
                out.insert(full_key, other.to_string());
            }
        }
    }
}
