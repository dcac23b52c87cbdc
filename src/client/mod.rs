//! Clients for the remote parsing and execution services
//!
//! Both services speak JSON over `POST`. The traits are the seam the
//! orchestrator depends on; the HTTP implementations share one
//! `reqwest::Client` and one reply classifier.

mod database;
mod parser;

pub use database::HttpExecutor;
pub use parser::HttpParser;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::error::{ConfigError, ExecutionError, ParseError};
use crate::query::{EnrichedOperation, ParsedOperation, QueryText};

/// Turns query text into an operation descriptor
#[async_trait]
pub trait QueryParser: Send + Sync {
    async fn parse(&self, text: &QueryText) -> Result<ParsedOperation, ParseError>;
}

/// Runs an enriched descriptor against an index engine
#[async_trait]
pub trait OperationExecutor: Send + Sync {
    async fn execute(&self, operation: &EnrichedOperation) -> Result<Value, ExecutionError>;
}

/// Service URLs derived from the configured base
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub parser: String,
    pub database: String,
}

impl Endpoints {
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let base = base_url.trim().trim_end_matches('/');
        let parsed = Url::parse(base).map_err(|source| ConfigError::BaseUrl {
            url: base_url.to_string(),
            source,
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::Scheme(parsed.scheme().to_string()));
        }

        Ok(Self {
            parser: format!("{}/parser", base),
            database: format!("{}/database", base),
        })
    }
}

/// Build the shared HTTP client
pub fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to build HTTP client, using defaults");
            reqwest::Client::new()
        })
}

/// HTTP parser and executor sharing one connection pool
pub fn http_services(
    base_url: &str,
    timeout: Duration,
) -> Result<(HttpParser, HttpExecutor), ConfigError> {
    let endpoints = Endpoints::new(base_url)?;
    let http = http_client(timeout);
    Ok((
        HttpParser::new(http.clone(), endpoints.parser),
        HttpExecutor::new(http, endpoints.database),
    ))
}

/// What came back from a service, before phase-specific mapping
#[derive(Debug)]
enum Reply {
    /// 2xx with a JSON body that carries no `error`
    Success(Value),
    /// Non-2xx, or 2xx whose body carries an `error`
    Failure { status: u16, body: Value },
}

/// POST `body` to `url` and classify the reply.
///
/// `Err` is a transport failure: the request never completed, or the
/// body of a successful reply was not JSON.
async fn post_json<T: Serialize + ?Sized>(
    http: &reqwest::Client,
    url: &str,
    body: &T,
) -> Result<Reply, String> {
    debug!(url, "sending request");
    let response = http
        .post(url)
        .json(body)
        .send()
        .await
        .map_err(describe_transport)?;

    let status = response.status();
    let text = response.text().await.map_err(describe_transport)?;
    debug!(url, status = status.as_u16(), bytes = text.len(), "received reply");

    if !status.is_success() {
        let body = serde_json::from_str(&text).unwrap_or_else(|_| {
            if text.trim().is_empty() {
                Value::Null
            } else {
                Value::String(text.trim().to_string())
            }
        });
        return Ok(Reply::Failure {
            status: status.as_u16(),
            body,
        });
    }

    let value: Value = serde_json::from_str(&text).map_err(|e| {
        let preview: String = text.chars().take(200).collect();
        format!("invalid response body from {}: {} ({})", url, e, preview)
    })?;

    if value.get("error").is_some_and(|e| !e.is_null()) {
        return Ok(Reply::Failure {
            status: status.as_u16(),
            body: value,
        });
    }

    Ok(Reply::Success(value))
}

fn describe_transport(e: reqwest::Error) -> String {
    if e.is_timeout() {
        format!("request timed out: {}", e)
    } else if e.is_connect() {
        format!("connection failed: {}", e)
    } else {
        e.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_from_base() {
        let endpoints = Endpoints::new("http://localhost:8000/").unwrap();
        assert_eq!(endpoints.parser, "http://localhost:8000/parser");
        assert_eq!(endpoints.database, "http://localhost:8000/database");

        let endpoints = Endpoints::new("https://db.example.com/api").unwrap();
        assert_eq!(endpoints.database, "https://db.example.com/api/database");
    }

    #[test]
    fn test_endpoints_reject_bad_urls() {
        assert!(matches!(
            Endpoints::new("not a url"),
            Err(ConfigError::BaseUrl { .. })
        ));
        assert!(matches!(
            Endpoints::new("ftp://example.com"),
            Err(ConfigError::Scheme(s)) if s == "ftp"
        ));
    }
}
