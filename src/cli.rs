//! Command-line argument parsing for scout-query.

use clap::{Parser, Subcommand};
use scout_query::config::{ClientConfig, ConfigOverrides};
use scout_query::output::OutputFormat;
use scout_query::query::QueryRequest;
use serde_json::Value;
use std::path::PathBuf;

/// Run analytics queries against the local store or the remote query service.
#[derive(Parser, Debug)]
#[command(name = "scout-query")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Path of the local SQLite store
    #[arg(long, value_name = "PATH")]
    pub local_db: Option<PathBuf>,

    /// Base URL of the remote query service
    #[arg(long, value_name = "URL")]
    pub remote_url: Option<String>,

    /// Timeout per remote attempt, in milliseconds
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Maximum remote attempts
    #[arg(long, value_name = "N")]
    pub max_retries: Option<u32>,

    /// Use mock backends (no store or network, for testing)
    #[arg(long)]
    pub mock: bool,

    /// Output format: json or text
    #[arg(long, value_name = "FORMAT", default_value = "json")]
    pub format: OutputFormat,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Execute an arbitrary query
    Query {
        /// Query text
        text: String,

        /// Positional bind value; parsed as JSON, otherwise taken as a string
        #[arg(short, long = "param", value_name = "VALUE")]
        params: Vec<String>,

        /// Routing target: local or remote
        #[arg(short, long, value_name = "TARGET")]
        target: Option<String>,
    },
    /// Revenue and transaction-count KPIs for the trailing month
    Kpis,
    /// Stores ranked by trailing-month revenue
    Stores,
    /// Daily transaction trend for the trailing 30 days
    Trends,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path, using the default if not specified.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(ClientConfig::default_path)
    }

    /// Collects the flags that override file and environment settings.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            local_store_path: self.local_db.clone(),
            remote_endpoint: self.remote_url.clone(),
            timeout_ms: self.timeout_ms,
            max_retries: self.max_retries,
            ..Default::default()
        }
    }
}

/// Builds the request for the `query` command.
pub fn query_request(text: &str, params: &[String], target: Option<&str>) -> QueryRequest {
    QueryRequest {
        text: Some(text.to_string()),
        parameters: (!params.is_empty())
            .then(|| Value::Array(params.iter().map(|p| parse_param(p)).collect())),
        target: target.map(String::from),
    }
}

/// Parses a bind value as JSON, falling back to a plain string.
fn parse_param(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
