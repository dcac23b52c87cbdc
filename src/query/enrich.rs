//! Enrichment: attach the selected index engine before dispatch
//!
//! Pure functions over a parsed descriptor. Only ops in
//! [`INDEX_REQUIRING_OPS`](super::INDEX_REQUIRING_OPS) get an `idx`.

use serde::Serialize;
use serde_json::{Map, Value};

use super::operation::{ParsedOperation, requires_index};
use super::selector::{IndexSelector, SelectorPolicy};
use crate::error::ValidationError;

/// Descriptor ready for the execution service
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EnrichedOperation(Map<String, Value>);

impl EnrichedOperation {
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn op_code(&self) -> Option<i64> {
        self.0.get("op").and_then(Value::as_i64)
    }

    /// The `idx` attached during enrichment, if any
    pub fn index(&self) -> Option<&str> {
        self.0.get("idx").and_then(Value::as_str)
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

/// Build the dispatchable descriptor for `parsed` under `selector`
pub fn enrich(
    parsed: &ParsedOperation,
    selector: IndexSelector,
) -> Result<EnrichedOperation, ValidationError> {
    let (fields, op) = parsed.validated()?;
    let mut out = fields.clone();
    if requires_index(op) {
        out.insert("idx".to_string(), Value::String(selector.as_str().to_string()));
    } else {
        out.remove("idx");
    }
    Ok(EnrichedOperation(out))
}

/// Enrichment with selector validation under a policy
#[derive(Debug, Clone, Copy, Default)]
pub struct Enricher {
    policy: SelectorPolicy,
}

impl Enricher {
    pub fn new(policy: SelectorPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> SelectorPolicy {
        self.policy
    }

    /// Enrich with a selector as the user typed it
    pub fn enrich(
        &self,
        parsed: &ParsedOperation,
        selector: &str,
    ) -> Result<EnrichedOperation, ValidationError> {
        parsed.validated()?;
        let selector = self.policy.resolve(selector)?;
        enrich(parsed, selector)
    }

    /// Enrich untyped inputs, e.g. a descriptor and selector read from JSON
    pub fn enrich_value(
        &self,
        parsed: &Value,
        selector: &Value,
    ) -> Result<EnrichedOperation, ValidationError> {
        let parsed = ParsedOperation::new(parsed.clone());
        parsed.validated()?;
        let selector = self.policy.resolve_value(selector)?;
        enrich(&parsed, selector)
    }
}
