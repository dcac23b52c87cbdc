// src/lib.rs

//! Query console for Mini DB.
//!
//! A query goes through four stages: the parser service turns text into an
//! operation descriptor, the descriptor is enriched with the selected index
//! engine, the database service executes it, and the result is normalized
//! into a view model for display.

pub mod client;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod query;
pub mod repl;
pub mod view;

pub use error::{ConfigError, ExecutionError, ParseError, ValidationError};
pub use pipeline::{Orchestrator, PipelineOutcome, PipelineState, Submission};
