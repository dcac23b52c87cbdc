//! Query pipeline: state machine, outcomes and the orchestrator

mod orchestrator;
mod outcome;
mod state;

pub use orchestrator::Orchestrator;
pub use outcome::{FailureKind, PipelineOutcome, Submission};
pub use state::{PipelineState, StateTransition};
