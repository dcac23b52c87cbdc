//! Pipeline state machine
//!
//! One run walks `Idle → Parsing → Parsed → Enriching → Enriched →
//! Executing → Completed`, leaving early through one of the failure
//! states. The machine drops back to `Idle` once the outcome is out, or
//! straight from an active state when the run is cancelled.

use std::time::Instant;

/// Current state of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineState {
    /// Ready to accept a query
    Idle,

    /// Waiting on the parsing service
    Parsing,
    ParseFailed,
    Parsed,

    /// Validating the descriptor and attaching the index engine
    Enriching,
    ValidationFailed,
    Enriched,

    /// Waiting on the execution service
    Executing,
    ExecutionFailed,
    Completed,
}

/// A transition between states of one run
#[derive(Debug, Clone)]
pub struct StateTransition {
    pub run: u64,
    pub from: PipelineState,
    pub to: PipelineState,
    pub timestamp: Instant,
}

impl PipelineState {
    /// Check if this is a terminal state for a run
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::ParseFailed | Self::ValidationFailed | Self::ExecutionFailed | Self::Completed
        )
    }

    /// Check if a remote call or validation is in progress
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            Self::Parsing | Self::Parsed | Self::Enriching | Self::Enriched | Self::Executing
        )
    }

    /// Whether `self → next` is an edge of the machine
    pub fn can_transition_to(&self, next: PipelineState) -> bool {
        use PipelineState::*;
        match (self, next) {
            (Idle, Parsing) => true,
            (Parsing, ParseFailed | Parsed) => true,
            (Parsed, Enriching) => true,
            (Enriching, ValidationFailed | Enriched) => true,
            (Enriched, Executing) => true,
            (Executing, ExecutionFailed | Completed) => true,
            // terminal states return to Idle; active ones only on cancellation
            (from, Idle) => from.is_terminal() || from.is_active(),
            _ => false,
        }
    }

    /// Get human-readable status
    pub fn status_message(&self) -> &'static str {
        match self {
            Self::Idle => "Ready",
            Self::Parsing => "Parsing query...",
            Self::ParseFailed => "Query did not parse",
            Self::Parsed => "Parsed",
            Self::Enriching => "Validating operation...",
            Self::ValidationFailed => "Operation rejected before dispatch",
            Self::Enriched => "Ready to dispatch",
            Self::Executing => "Executing...",
            Self::ExecutionFailed => "Execution failed",
            Self::Completed => "Completed",
        }
    }
}
