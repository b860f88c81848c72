//! Mock backends for testing.
//!
//! Provide canned outcomes without a store or network, and count how many
//! times they were invoked.

use super::{QueryBackend, RawOutcome};
use crate::error::{QueryError, Result};
use crate::query::{Record, ValidatedRequest};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A backend that returns predefined results.
#[derive(Debug, Default)]
pub struct MockBackend {
    outcome: Option<RawOutcome>,
    calls: AtomicUsize,
}

impl MockBackend {
    /// Creates a mock that echoes each query back as a single row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock that always returns the given outcome.
    pub fn with_outcome(outcome: RawOutcome) -> Self {
        Self {
            outcome: Some(outcome),
            calls: AtomicUsize::new(0),
        }
    }

    /// Returns how many times the backend was invoked.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QueryBackend for MockBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn execute(&self, request: &ValidatedRequest) -> Result<RawOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(outcome) = &self.outcome {
            return Ok(outcome.clone());
        }

        let mut row = Record::new();
        row.insert(
            "result".to_string(),
            Value::String(format!("Mock result for: {}", request.text)),
        );
        Ok(RawOutcome::new(vec![row], vec!["result".to_string()]))
    }
}

/// A backend that always fails with the given error.
#[derive(Debug)]
pub struct FailingBackend {
    error: QueryError,
    calls: AtomicUsize,
}

impl FailingBackend {
    /// Creates a backend failing with `error` on every call.
    pub fn new(error: QueryError) -> Self {
        Self {
            error,
            calls: AtomicUsize::new(0),
        }
    }

    /// Returns how many times the backend was invoked.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QueryBackend for FailingBackend {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn execute(&self, _request: &ValidatedRequest) -> Result<RawOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(self.error.clone())
    }
}
