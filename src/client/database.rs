// src/client/database.rs

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use super::{post_json, OperationExecutor, Reply};
use crate::error::ExecutionError;
use crate::query::EnrichedOperation;

/// Execution service over HTTP (`POST <base>/database`)
#[derive(Debug, Clone)]
pub struct HttpExecutor {
    http: reqwest::Client,
    url: String,
}

impl HttpExecutor {
    pub fn new(http: reqwest::Client, url: String) -> Self {
        Self { http, url }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl OperationExecutor for HttpExecutor {
    async fn execute(&self, operation: &EnrichedOperation) -> Result<Value, ExecutionError> {
        match post_json(&self.http, &self.url, operation).await {
            Ok(Reply::Success(value)) => {
                info!(
                    op = operation.op_code(),
                    engine = value.get("engine").and_then(serde_json::Value::as_str),
                    "operation executed"
                );
                Ok(value)
            }
            Ok(Reply::Failure { status, body }) => {
                let err = ExecutionError::service(Some(status), body);
                info!(status, message = err.message(), "operation rejected");
                Err(err)
            }
            Err(transport) => Err(ExecutionError::Transport(transport)),
        }
    }
}
