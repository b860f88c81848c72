//! Error types for the Scout query client.
//!
//! Defines the error enum used throughout the crate. None of these escape
//! [`crate::client::QueryClient`]: the client folds them into a failed
//! [`crate::query::QueryResult`].

use thiserror::Error;

/// Main error type for query client operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// Malformed request (missing query text, unknown routing target, etc.)
    #[error("Query validation failed: {0}")]
    Validation(String),

    /// Remote attempt exceeded the configured timeout.
    #[error("Remote query failed (timeout): {0}")]
    Timeout(String),

    /// Remote network failure (connection refused/reset, 5xx responses, etc.)
    #[error("Remote query failed (transport): {message}")]
    Transport {
        message: String,
        /// Whether another attempt may succeed.
        transient: bool,
    },

    /// Remote backend explicitly refused the query.
    #[error("Remote query failed (rejected): {0}")]
    RemoteRejected(String),

    /// Embedded store errors (store missing, SQL errors, etc.)
    #[error("Local query failed: {0}")]
    LocalExecution(String),

    /// Configuration errors (invalid config file, bad endpoint, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse failure classification carried by a failed result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Validation,
    Transport,
    RemoteRejection,
    LocalExecution,
    Internal,
}

impl QueryError {
    /// Creates a validation error with the given message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Creates a timeout error with the given message.
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Creates a transient transport error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport {
            message: msg.into(),
            transient: true,
        }
    }

    /// Creates a transport error that must not be retried.
    pub fn transport_fatal(msg: impl Into<String>) -> Self {
        Self::Transport {
            message: msg.into(),
            transient: false,
        }
    }

    /// Creates a remote rejection error with the given message.
    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::RemoteRejected(msg.into())
    }

    /// Creates a local execution error with the given message.
    pub fn local(msg: impl Into<String>) -> Self {
        Self::LocalExecution(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Validation(_) => "Validation Error",
            Self::Timeout(_) => "Timeout Error",
            Self::Transport { .. } => "Transport Error",
            Self::RemoteRejected(_) => "Remote Rejection",
            Self::LocalExecution(_) => "Local Execution Error",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }

    /// Returns the failure classification reported to callers.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Validation(_) => FailureKind::Validation,
            Self::Timeout(_) | Self::Transport { .. } => FailureKind::Transport,
            Self::RemoteRejected(_) => FailureKind::RemoteRejection,
            Self::LocalExecution(_) => FailureKind::LocalExecution,
            Self::Config(_) | Self::Internal(_) => FailureKind::Internal,
        }
    }

    /// Returns true if a remote dispatch may be attempted again.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout(_) => true,
            Self::Transport { transient, .. } => *transient,
            _ => false,
        }
    }
}

/// Result type alias using QueryError.
pub type Result<T> = std::result::Result<T, QueryError>;
