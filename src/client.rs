//! The query client facade.
//!
//! [`QueryClient`] runs every request through validation, routing and
//! normalization, and always answers with a [`QueryResult`]. It holds no
//! mutable state, so one instance can serve concurrent callers.

use crate::backend::{BackendRouter, LocalBackend, QueryBackend, RemoteBackend};
use crate::config::ClientConfig;
use crate::error::Result;
use crate::query::{builders, normalize, validate, QueryRequest, QueryResult};
use std::sync::Arc;
use tracing::info;

/// Validates, routes and normalizes queries against the local and remote backends.
#[derive(Clone)]
pub struct QueryClient {
    config: Arc<ClientConfig>,
    router: BackendRouter,
}

impl QueryClient {
    /// Creates a client with the SQLite and HTTP backends described by `config`.
    ///
    /// Must be called from within a Tokio runtime. The local store is not
    /// opened until the first local query.
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let local = LocalBackend::open(&config.local_store_path);
        let remote = RemoteBackend::new(&config)?;

        info!(
            "Query client ready (local store: {}, remote: {})",
            config.local_store_path.display(),
            remote.query_url()
        );

        Ok(Self::with_backends(config, Arc::new(local), Arc::new(remote)))
    }

    /// Creates a client over caller-supplied backends.
    pub fn with_backends(
        config: ClientConfig,
        local: Arc<dyn QueryBackend>,
        remote: Arc<dyn QueryBackend>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            router: BackendRouter::new(local, remote),
        }
    }

    /// Returns the configuration this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Executes one query. Invalid requests never reach a backend.
    pub async fn execute_query(&self, request: QueryRequest) -> QueryResult {
        match validate(&request) {
            Ok(validated) => self.router.dispatch(&validated).await,
            Err(e) => normalize::failure(&e),
        }
    }

    /// Revenue and transaction-count KPIs over the trailing month.
    pub async fn aggregate_kpis(&self) -> QueryResult {
        self.execute_query(builders::aggregate_kpis()).await
    }

    /// Stores ranked by trailing-month revenue.
    pub async fn store_ranking(&self) -> QueryResult {
        self.execute_query(builders::store_ranking()).await
    }

    /// Per-day transaction trend over the trailing 30 days.
    pub async fn transaction_trends(&self) -> QueryResult {
        self.execute_query(builders::transaction_trends()).await
    }
}
