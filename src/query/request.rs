//! Query requests and the request validator.
//!
//! A [`QueryRequest`] is the loosely-typed shape callers hand in (it mirrors
//! the JSON body accepted by the route layer). [`validate`] turns it into a
//! [`ValidatedRequest`] or a validation error; it never touches a backend.

use crate::error::{QueryError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Which backend executes a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RoutingTarget {
    /// Embedded SQLite store.
    #[default]
    Local,
    /// Networked query service.
    Remote,
}

impl RoutingTarget {
    /// Returns the target as its wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Remote => "remote",
        }
    }

    /// Parses a target from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "local" => Some(Self::Local),
            "remote" => Some(Self::Remote),
            _ => None,
        }
    }
}

impl fmt::Display for RoutingTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request to execute one logical query, as received from a caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Query body, interpreted by the backend.
    #[serde(default, alias = "query")]
    pub text: Option<String>,

    /// Positional bind values. Must be an array when present.
    #[serde(default, alias = "params")]
    pub parameters: Option<Value>,

    /// Routing key; `local` when absent.
    #[serde(default, alias = "database")]
    pub target: Option<String>,
}

impl QueryRequest {
    /// Creates a request for the given query text with the default target.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            parameters: None,
            target: None,
        }
    }

    /// Sets the routing target.
    pub fn with_target(mut self, target: RoutingTarget) -> Self {
        self.target = Some(target.as_str().to_string());
        self
    }

    /// Sets the positional bind values.
    pub fn with_parameters(mut self, parameters: Vec<Value>) -> Self {
        self.parameters = Some(Value::Array(parameters));
        self
    }
}

/// A request that passed validation. Only the router consumes these.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    pub text: String,
    pub parameters: Vec<Value>,
    pub target: RoutingTarget,
}

/// Validates and normalizes a request.
///
/// Every problem found is listed in the error message as `field: reason`, so
/// callers can recover the underlying cause and not just "invalid".
pub fn validate(request: &QueryRequest) -> Result<ValidatedRequest> {
    let mut issues = Vec::new();

    let text = match request.text.as_deref() {
        None => {
            issues.push("text: required".to_string());
            None
        }
        Some("") => {
            issues.push("text: must be a non-empty string".to_string());
            None
        }
        Some(t) => Some(t.to_string()),
    };

    let parameters = match &request.parameters {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(values)) => values.clone(),
        Some(other) => {
            issues.push(format!(
                "parameters: expected an array, received {}",
                json_type_name(other)
            ));
            Vec::new()
        }
    };

    let target = match request.target.as_deref() {
        None => RoutingTarget::default(),
        Some(raw) => RoutingTarget::parse(raw).unwrap_or_else(|| {
            issues.push(format!(
                "target: invalid value '{raw}', expected 'local' or 'remote'"
            ));
            RoutingTarget::default()
        }),
    };

    match text {
        Some(text) if issues.is_empty() => Ok(ValidatedRequest {
            text,
            parameters,
            target,
        }),
        _ => Err(QueryError::validation(issues.join("; "))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
