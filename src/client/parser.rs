// src/client/parser.rs

use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

use super::{post_json, QueryParser, Reply};
use crate::error::{service_message, ParseError};
use crate::query::{ParsedOperation, QueryText};

#[derive(Debug, Serialize)]
struct ParseRequest<'a> {
    text: &'a str,
}

/// Parsing service over HTTP (`POST <base>/parser`)
#[derive(Debug, Clone)]
pub struct HttpParser {
    http: reqwest::Client,
    url: String,
}

impl HttpParser {
    pub fn new(http: reqwest::Client, url: String) -> Self {
        Self { http, url }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl QueryParser for HttpParser {
    async fn parse(&self, text: &QueryText) -> Result<ParsedOperation, ParseError> {
        let request = ParseRequest { text: text.as_str() };

        match post_json(&self.http, &self.url, &request).await {
            Ok(Reply::Success(value)) => {
                info!(op = ?value.get("op"), "query parsed");
                Ok(ParsedOperation::new(value))
            }
            Ok(Reply::Failure { status, body }) => {
                let message = service_message(&body, Some(status));
                info!(status, %message, "parser rejected query");
                Err(ParseError::Service(message))
            }
            Err(transport) => Err(ParseError::Transport(transport)),
        }
    }
}
