// src/error.rs
//! Error taxonomy for the query pipeline
//!
//! Every failure is a value: the orchestrator stores it in the run's
//! outcome and the console renders each kind with its own label.

use serde_json::Value;
use thiserror::Error;

/// The parsing service could not turn text into an operation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// Network failure, timeout, or a body that was not JSON
    #[error("parser unreachable: {0}")]
    Transport(String),

    /// The parsing service answered with an error
    #[error("{0}")]
    Service(String),
}

/// The parsed operation cannot be dispatched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid query object")]
    InvalidQueryObject,

    #[error("invalid index type")]
    InvalidIndexType,

    #[error("unknown index engine")]
    UnknownIndex,
}

impl ValidationError {
    /// Stable machine-readable reason
    pub fn reason(&self) -> &'static str {
        match self {
            Self::InvalidQueryObject => "invalid-query-object",
            Self::InvalidIndexType => "invalid-index-type",
            Self::UnknownIndex => "unknown-index",
        }
    }
}

/// The execution service could not run the operation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExecutionError {
    /// Network failure, timeout, or a body that was not JSON
    #[error("database unreachable: {0}")]
    Transport(String),

    /// The execution service rejected the operation
    #[error("{message}")]
    Service {
        status: Option<u16>,
        message: String,
        payload: Value,
    },
}

impl ExecutionError {
    /// Wrap a service-provided error payload
    pub fn service(status: Option<u16>, payload: Value) -> Self {
        Self::Service {
            status,
            message: service_message(&payload, status),
            payload,
        }
    }

    /// Short human-readable message
    pub fn message(&self) -> &str {
        match self {
            Self::Transport(msg) => msg,
            Self::Service { message, .. } => message,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Invalid console configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid API base URL '{url}': {source}")]
    BaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported URL scheme '{0}' (expected http or https)")]
    Scheme(String),
}

/// Best message a service error body offers.
///
/// Services answer with `error`, `message` or `detail`; any of them may
/// itself be a string or a nested object.
pub fn service_message(payload: &Value, status: Option<u16>) -> String {
    match payload {
        Value::String(s) => return s.clone(),
        Value::Object(map) => {
            for key in ["error", "message", "detail"] {
                match map.get(key) {
                    Some(Value::String(s)) => return s.clone(),
                    Some(nested @ Value::Object(_)) => return service_message(nested, status),
                    Some(Value::Null) | None => {}
                    Some(other) => return other.to_string(),
                }
            }
        }
        _ => {}
    }

    match (payload, status) {
        (Value::Null, Some(code)) => format!("HTTP {}", code),
        (Value::Null, None) => "unknown service error".to_string(),
        (other, _) => other.to_string(),
    }
}
