//! Response normalization.
//!
//! Collapses whatever a backend produced into a [`QueryResult`].

use crate::backend::RawOutcome;
use crate::error::{QueryError, Result};
use crate::query::QueryResult;
use std::collections::HashSet;
use std::time::Duration;
use tracing::warn;

/// Normalizes a backend outcome measured over `elapsed`.
///
/// Missing columns become an empty list; the row count is always taken from
/// the rows themselves.
pub fn normalize(outcome: Result<RawOutcome>, elapsed: Duration) -> QueryResult {
    match outcome {
        Ok(raw) => {
            let columns = unique_columns(raw.columns.unwrap_or_default());
            QueryResult::success(raw.rows, columns, elapsed)
        }
        Err(e) => failure(&e),
    }
}

/// Builds a failed result, logging the cause.
pub fn failure(error: &QueryError) -> QueryResult {
    warn!("{}: {}", error.category(), error);
    QueryResult::failure(error)
}

/// Drops repeated column names, keeping the first occurrence.
fn unique_columns(columns: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    columns
        .into_iter()
        .filter(|c| seen.insert(c.clone()))
        .collect()
}
