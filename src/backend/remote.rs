//! Remote HTTP execution strategy.
//!
//! Posts the query to `{remote_endpoint}/query` with a bearer credential and
//! retries transient failures with exponential backoff.

use super::{QueryBackend, RawOutcome};
use crate::config::ClientConfig;
use crate::error::{QueryError, Result};
use crate::query::{Record, ValidatedRequest};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Longest slice of a response body quoted in a failure message.
const MAX_DETAIL_CHARS: usize = 300;

/// Remote query service client.
#[derive(Debug, Clone)]
pub struct RemoteBackend {
    client: Client,
    query_url: Url,
    token: String,
    max_attempts: u32,
    retry_base_delay: Duration,
    timeout: Duration,
}

impl RemoteBackend {
    /// Creates a backend from the client configuration.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let query_url = join_query_path(config.remote_url()?)?;

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| QueryError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            query_url,
            token: config.bearer_token().to_string(),
            max_attempts: config.max_retries.max(1),
            retry_base_delay: Duration::from_millis(config.retry_base_delay_ms),
            timeout: config.timeout(),
        })
    }

    /// Returns the URL queries are posted to.
    pub fn query_url(&self) -> &Url {
        &self.query_url
    }

    /// Performs a single request/response exchange.
    async fn attempt(&self, body: &RemoteQueryRequest<'_>) -> Result<RawOutcome> {
        let response = self
            .client
            .post(self.query_url.clone())
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| self.classify_request_error(e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| self.classify_request_error(e))?;

        if !status.is_success() {
            return Err(parse_error(status, &text));
        }

        parse_success(&text)
    }

    /// Maps a reqwest error to a timeout or transport failure.
    fn classify_request_error(&self, error: reqwest::Error) -> QueryError {
        if error.is_timeout() {
            QueryError::timeout(format!(
                "no response within {} ms: {error}",
                self.timeout.as_millis()
            ))
        } else if error.is_connect() {
            QueryError::transport(format!("failed to connect to {}: {error}", self.query_url))
        } else if error.is_builder() {
            QueryError::transport_fatal(format!("could not build request: {error}"))
        } else {
            QueryError::transport(format!("request failed: {error}"))
        }
    }
}

/// Appends the `query` path segment, keeping any query string on the endpoint.
fn join_query_path(mut base: Url) -> Result<Url> {
    if base.cannot_be_a_base() {
        return Err(QueryError::config(format!(
            "Invalid remote query URL: {base}"
        )));
    }
    if let Ok(mut segments) = base.path_segments_mut() {
        segments.pop_if_empty().push("query");
    }
    Ok(base)
}

#[async_trait]
impl QueryBackend for RemoteBackend {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn execute(&self, request: &ValidatedRequest) -> Result<RawOutcome> {
        let body = RemoteQueryRequest {
            query: &request.text,
            params: &request.parameters,
        };

        let mut delay = self.retry_base_delay;
        let mut attempt = 1;

        loop {
            debug!(
                "Remote query attempt {} of {} to {}",
                attempt, self.max_attempts, self.query_url
            );

            match self.attempt(&body).await {
                Ok(outcome) => return Ok(outcome),
                Err(e) if e.is_transient() && attempt < self.max_attempts => {
                    warn!(
                        "Remote query failed (attempt {}), retrying in {:?}: {}",
                        attempt, delay, e
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2; // Exponential backoff
                    attempt += 1;
                }
                Err(e) if e.is_transient() => return Err(exhausted(e, attempt)),
                Err(e) => return Err(e),
            }
        }
    }
}

/// Notes the attempt count on a transient error that used up every attempt.
fn exhausted(error: QueryError, attempts: u32) -> QueryError {
    let suffix = format!(" (gave up after {attempts} attempt(s))");
    match error {
        QueryError::Timeout(msg) => QueryError::Timeout(msg + &suffix),
        QueryError::Transport { message, transient } => QueryError::Transport {
            message: message + &suffix,
            transient,
        },
        other => other,
    }
}

/// Classifies a non-2xx response.
///
/// 5xx, 408 and 429 may clear up on their own and are retried; any other
/// status is the service refusing the query.
fn parse_error(status: StatusCode, body: &str) -> QueryError {
    let detail = serde_json::from_str::<RemoteQueryResponse>(body)
        .ok()
        .and_then(|r| r.error.as_ref().map(error_text))
        .unwrap_or_else(|| truncate(body));

    let message = if detail.is_empty() {
        format!("remote returned {status}")
    } else {
        format!("remote returned {status}: {detail}")
    };

    let is_retryable = status.is_server_error()
        || status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS;

    if is_retryable {
        QueryError::transport(message)
    } else {
        QueryError::rejected(message)
    }
}

/// Parses a 2xx response body into rows and optional columns.
fn parse_success(body: &str) -> Result<RawOutcome> {
    let response: RemoteQueryResponse = serde_json::from_str(body)
        .map_err(|e| QueryError::rejected(format!("malformed response payload: {e}")))?;

    if let Some(error) = &response.error {
        return Err(QueryError::rejected(error_text(error)));
    }
    if response.success == Some(false) {
        return Err(QueryError::rejected("remote reported failure without detail"));
    }

    Ok(RawOutcome {
        rows: response.data.unwrap_or_default(),
        columns: response.columns,
    })
}

/// Extracts a message from an `error` field that may be a string or object.
fn error_text(error: &Value) -> String {
    match error {
        Value::String(s) => s.clone(),
        Value::Object(map) => match map.get("message") {
            Some(Value::String(s)) => s.clone(),
            _ => error.to_string(),
        },
        other => other.to_string(),
    }
}

fn truncate(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= MAX_DETAIL_CHARS {
        trimmed.to_string()
    } else {
        let head: String = trimmed.chars().take(MAX_DETAIL_CHARS).collect();
        format!("{head}...")
    }
}

// Remote wire types

#[derive(Debug, Serialize)]
struct RemoteQueryRequest<'a> {
    query: &'a str,
    params: &'a [Value],
}

#[derive(Debug, Deserialize)]
struct RemoteQueryResponse {
    #[serde(default, alias = "rows")]
    data: Option<Vec<Record>>,
    #[serde(default)]
    columns: Option<Vec<String>>,
    #[serde(default)]
    error: Option<Value>,
    #[serde(default)]
    success: Option<bool>,
}
