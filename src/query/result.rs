//! Uniform query result envelope.
//!
//! Both backends produce the same [`QueryResult`] shape. The constructors are
//! the only way to build one, which keeps the success/failure invariants
//! intact: a success carries rows and full metadata and no message; a
//! failure carries a message and nothing else.

use crate::error::{FailureKind, QueryError};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// One result row, keyed by column name in column order.
pub type Record = serde_json::Map<String, Value>;

/// Shape metadata attached to every successful result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultMetadata {
    /// Always equal to the number of rows.
    pub row_count: usize,

    /// Wall-clock duration of the dispatch.
    #[serde(rename = "executionTime")]
    pub execution_time_ms: u64,

    /// Column names, unique and in result order.
    pub columns: Vec<String>,
}

/// Outcome of one execution attempt, whichever backend served it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    #[serde(rename = "success")]
    succeeded: bool,

    #[serde(rename = "data", skip_serializing_if = "Option::is_none")]
    rows: Option<Vec<Record>>,

    #[serde(rename = "error", skip_serializing_if = "Option::is_none")]
    failure_message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<ResultMetadata>,

    #[serde(skip)]
    failure_kind: Option<FailureKind>,
}

impl QueryResult {
    /// Creates a successful result. `row_count` is derived from `rows`.
    pub fn success(rows: Vec<Record>, columns: Vec<String>, execution_time: Duration) -> Self {
        let metadata = ResultMetadata {
            row_count: rows.len(),
            execution_time_ms: execution_time.as_millis() as u64,
            columns,
        };
        Self {
            succeeded: true,
            rows: Some(rows),
            failure_message: None,
            metadata: Some(metadata),
            failure_kind: None,
        }
    }

    /// Creates a failed result from an error.
    pub fn failure(error: &QueryError) -> Self {
        Self {
            succeeded: false,
            rows: None,
            failure_message: Some(error.to_string()),
            metadata: None,
            failure_kind: Some(error.kind()),
        }
    }

    /// Returns true if the query succeeded.
    pub fn succeeded(&self) -> bool {
        self.succeeded
    }

    /// Returns the rows of a successful result.
    pub fn rows(&self) -> Option<&[Record]> {
        self.rows.as_deref()
    }

    /// Returns the diagnostic message of a failed result.
    pub fn failure_message(&self) -> Option<&str> {
        self.failure_message.as_deref()
    }

    /// Returns the failure classification of a failed result.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        self.failure_kind
    }

    /// Returns shape metadata of a successful result.
    pub fn metadata(&self) -> Option<&ResultMetadata> {
        self.metadata.as_ref()
    }

    /// Returns the number of rows (zero for failures).
    pub fn row_count(&self) -> usize {
        self.rows.as_ref().map_or(0, Vec::len)
    }
}
