//! Backend execution strategies and the router that selects between them.
//!
//! Each strategy implements [`QueryBackend`]. The [`BackendRouter`] holds one
//! strategy per [`RoutingTarget`] and knows nothing else about them.

mod local;
mod mock;
mod remote;

pub use local::LocalBackend;
pub use mock::{FailingBackend, MockBackend};
pub use remote::RemoteBackend;

use crate::error::Result;
use crate::query::{normalize, QueryResult, Record, RoutingTarget, ValidatedRequest};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// What a backend hands back before normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawOutcome {
    /// Result rows in backend order.
    pub rows: Vec<Record>,

    /// Column names, if the backend reported them.
    pub columns: Option<Vec<String>>,
}

impl RawOutcome {
    /// Creates an outcome with rows and known columns.
    pub fn new(rows: Vec<Record>, columns: Vec<String>) -> Self {
        Self {
            rows,
            columns: Some(columns),
        }
    }
}

/// Trait implemented by every execution strategy.
#[async_trait]
pub trait QueryBackend: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Executes a validated request.
    async fn execute(&self, request: &ValidatedRequest) -> Result<RawOutcome>;
}

/// Dispatches validated requests to the backend named by their target.
///
/// The target is read once per request. A failed dispatch is never retried
/// against the other backend.
#[derive(Clone)]
pub struct BackendRouter {
    local: Arc<dyn QueryBackend>,
    remote: Arc<dyn QueryBackend>,
}

impl BackendRouter {
    /// Creates a router over the two strategies.
    pub fn new(local: Arc<dyn QueryBackend>, remote: Arc<dyn QueryBackend>) -> Self {
        Self { local, remote }
    }

    /// Returns the strategy serving the given target.
    pub fn select(&self, target: RoutingTarget) -> &dyn QueryBackend {
        match target {
            RoutingTarget::Local => self.local.as_ref(),
            RoutingTarget::Remote => self.remote.as_ref(),
        }
    }

    /// Runs the request on its backend and normalizes the outcome.
    pub async fn dispatch(&self, request: &ValidatedRequest) -> QueryResult {
        let backend = self.select(request.target);
        debug!(
            "Dispatching query to {} backend ({} parameters)",
            backend.name(),
            request.parameters.len()
        );

        let start = Instant::now();
        let outcome = backend.execute(request).await;
        normalize::normalize(outcome, start.elapsed())
    }
}
