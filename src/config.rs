//! Configuration management for the query client.
//!
//! Builds a [`ClientConfig`] once at startup by layering, in increasing
//! precedence: built-in defaults, an optional TOML file, environment
//! variables, and caller overrides. Nothing re-reads configuration afterwards.

use crate::error::{QueryError, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Environment variable for the embedded store path.
pub const ENV_LOCAL_DB_PATH: &str = "SCOUT_LOCAL_DB_PATH";
/// Environment variable for the remote backend base URL.
pub const ENV_REMOTE_URL: &str = "MCP_SERVER_URL";
/// Environment variable for the per-attempt remote timeout.
pub const ENV_TIMEOUT_MS: &str = "MCP_TIMEOUT_MS";
/// Environment variable for the remote attempt ceiling.
pub const ENV_MAX_RETRIES: &str = "MCP_MAX_RETRIES";
/// Environment variable for the remote bearer credential.
pub const ENV_API_KEY: &str = "MCP_API_KEY";

fn default_local_store_path() -> PathBuf {
    PathBuf::from("./dev.db")
}

fn default_remote_endpoint() -> String {
    "https://mcp-sqlite-backend.onrender.com".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    250
}

/// Settings consumed by the backend router. Immutable once the client is built.
#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    /// Path of the embedded SQLite store.
    #[serde(default = "default_local_store_path")]
    pub local_store_path: PathBuf,

    /// Base URL of the remote query service.
    #[serde(default = "default_remote_endpoint")]
    pub remote_endpoint: String,

    /// Time budget for a single remote attempt.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum number of remote attempts, the first one included.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// First backoff delay between remote attempts; doubles each retry.
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,

    /// Bearer credential for the remote service.
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            local_store_path: default_local_store_path(),
            remote_endpoint: default_remote_endpoint(),
            timeout_ms: default_timeout_ms(),
            max_retries: default_max_retries(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            api_key: None,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("local_store_path", &self.local_store_path)
            .field("remote_endpoint", &self.remote_endpoint)
            .field("timeout_ms", &self.timeout_ms)
            .field("max_retries", &self.max_retries)
            .field("retry_base_delay_ms", &self.retry_base_delay_ms)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Caller-supplied values that take precedence over every other layer.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub local_store_path: Option<PathBuf>,
    pub remote_endpoint: Option<String>,
    pub timeout_ms: Option<u64>,
    pub max_retries: Option<u32>,
    pub retry_base_delay_ms: Option<u64>,
    pub api_key: Option<String>,
}

/// On-disk layout of the config file.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    client: Option<ClientConfig>,
}

impl ClientConfig {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("scout-query")
            .join("config.toml")
    }

    /// Resolves the full configuration: defaults, file, process environment,
    /// then overrides. The result is validated before it is returned.
    pub fn resolve(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self> {
        let default_path = Self::default_path();
        let mut config = Self::load_from_file(path.unwrap_or(default_path.as_path()))?;
        config.apply_env(|key| std::env::var(key).ok());
        config.apply_overrides(overrides);
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file. A missing file yields defaults.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| QueryError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content).map_err(|e| {
            QueryError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })?;
        Ok(file.client.unwrap_or_default())
    }

    /// Applies environment values using the given lookup.
    ///
    /// Unparseable numeric values are ignored and the previous layer wins.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_LOCAL_DB_PATH) {
            self.local_store_path = PathBuf::from(path);
        }
        if let Some(url) = lookup(ENV_REMOTE_URL) {
            self.remote_endpoint = url;
        }
        if let Some(timeout) = lookup(ENV_TIMEOUT_MS).and_then(|v| v.parse().ok()) {
            self.timeout_ms = timeout;
        }
        if let Some(retries) = lookup(ENV_MAX_RETRIES).and_then(|v| v.parse().ok()) {
            self.max_retries = retries;
        }
        if let Some(key) = lookup(ENV_API_KEY) {
            self.api_key = Some(key);
        }
    }

    /// Merges overrides into this config, with the overrides taking precedence.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(path) = &overrides.local_store_path {
            self.local_store_path = path.clone();
        }
        if let Some(url) = &overrides.remote_endpoint {
            self.remote_endpoint = url.clone();
        }
        if let Some(timeout) = overrides.timeout_ms {
            self.timeout_ms = timeout;
        }
        if let Some(retries) = overrides.max_retries {
            self.max_retries = retries;
        }
        if let Some(delay) = overrides.retry_base_delay_ms {
            self.retry_base_delay_ms = delay;
        }
        if overrides.api_key.is_some() {
            self.api_key = overrides.api_key.clone();
        }
    }

    /// Checks that the configuration can drive both backends.
    pub fn validate(&self) -> Result<()> {
        if self.timeout_ms == 0 {
            return Err(QueryError::config("timeout_ms must be greater than zero"));
        }
        if self.max_retries == 0 {
            return Err(QueryError::config("max_retries must be at least 1"));
        }
        if self.local_store_path.as_os_str().is_empty() {
            return Err(QueryError::config("local_store_path must not be empty"));
        }
        self.remote_url().map(|_| ())
    }

    /// Parses the remote endpoint as an http(s) URL.
    pub fn remote_url(&self) -> Result<Url> {
        let url = Url::parse(&self.remote_endpoint).map_err(|e| {
            QueryError::config(format!(
                "Invalid remote endpoint '{}': {e}",
                self.remote_endpoint
            ))
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(QueryError::config(format!(
                "Invalid scheme '{}'. Expected 'http' or 'https'",
                url.scheme()
            )));
        }

        Ok(url)
    }

    /// Returns the per-attempt remote timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Returns the bearer token, empty when no credential is configured.
    pub fn bearer_token(&self) -> &str {
        self.api_key.as_deref().unwrap_or("")
    }
}
