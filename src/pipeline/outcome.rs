//! Terminal result of one pipeline run

use serde_json::Value;
use std::sync::Arc;

use super::state::PipelineState;
use crate::error::{ExecutionError, ParseError, ValidationError};
use crate::query::{EnrichedOperation, ParsedOperation, QueryText};
use crate::view::ViewModel;

/// Exactly one of these per submitted non-blank query
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    Completed {
        query: QueryText,
        parsed: ParsedOperation,
        enriched: EnrichedOperation,
        result: Value,
        view: ViewModel,
    },
    ParseFailed {
        query: QueryText,
        error: ParseError,
    },
    ValidationFailed {
        query: QueryText,
        parsed: ParsedOperation,
        error: ValidationError,
    },
    ExecutionFailed {
        query: QueryText,
        parsed: ParsedOperation,
        enriched: EnrichedOperation,
        error: ExecutionError,
    },
}

/// How a failure should be presented to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The parser understood the request but not the query
    Syntax,
    /// The descriptor can't be dispatched as is
    Invalid,
    /// The engine refused the operation
    Rejected,
    /// A service could not be reached
    Unreachable,
}

impl FailureKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Syntax => "parse error",
            Self::Invalid => "invalid operation",
            Self::Rejected => "engine rejected operation",
            Self::Unreachable => "service unreachable",
        }
    }
}

impl PipelineOutcome {
    /// The terminal state this outcome corresponds to
    pub fn state(&self) -> PipelineState {
        match self {
            Self::Completed { .. } => PipelineState::Completed,
            Self::ParseFailed { .. } => PipelineState::ParseFailed,
            Self::ValidationFailed { .. } => PipelineState::ValidationFailed,
            Self::ExecutionFailed { .. } => PipelineState::ExecutionFailed,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    pub fn query(&self) -> &QueryText {
        match self {
            Self::Completed { query, .. }
            | Self::ParseFailed { query, .. }
            | Self::ValidationFailed { query, .. }
            | Self::ExecutionFailed { query, .. } => query,
        }
    }

    pub fn parsed(&self) -> Option<&ParsedOperation> {
        match self {
            Self::Completed { parsed, .. }
            | Self::ValidationFailed { parsed, .. }
            | Self::ExecutionFailed { parsed, .. } => Some(parsed),
            Self::ParseFailed { .. } => None,
        }
    }

    pub fn enriched(&self) -> Option<&EnrichedOperation> {
        match self {
            Self::Completed { enriched, .. } | Self::ExecutionFailed { enriched, .. } => {
                Some(enriched)
            }
            _ => None,
        }
    }

    pub fn view(&self) -> Option<&ViewModel> {
        match self {
            Self::Completed { view, .. } => Some(view),
            _ => None,
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Completed { .. } => None,
            Self::ParseFailed { error: ParseError::Transport(_), .. } => Some(FailureKind::Unreachable),
            Self::ParseFailed { error: ParseError::Service(_), .. } => Some(FailureKind::Syntax),
            Self::ValidationFailed { .. } => Some(FailureKind::Invalid),
            Self::ExecutionFailed { error, .. } if error.is_transport() => {
                Some(FailureKind::Unreachable)
            }
            Self::ExecutionFailed { .. } => Some(FailureKind::Rejected),
        }
    }

    /// Failure description, `None` on success
    pub fn error_message(&self) -> Option<String> {
        match self {
            Self::Completed { .. } => None,
            Self::ParseFailed { error, .. } => Some(error.to_string()),
            Self::ValidationFailed { error, .. } => {
                Some(format!("{} ({})", error, error.reason()))
            }
            Self::ExecutionFailed { error, .. } => Some(error.to_string()),
        }
    }
}

/// What `submit` hands back to its caller
#[derive(Debug, Clone)]
pub enum Submission {
    /// Blank input; nothing was contacted
    Ignored,
    /// A later submission or an explicit cancel took over this run
    Cancelled,
    /// The run reached a terminal state
    Finished(Arc<PipelineOutcome>),
}

impl Submission {
    pub fn outcome(&self) -> Option<&Arc<PipelineOutcome>> {
        match self {
            Self::Finished(outcome) => Some(outcome),
            _ => None,
        }
    }
}
