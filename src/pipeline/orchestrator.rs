//! Pipeline orchestrator
//!
//! Drives parse → enrich → execute for one query at a time. A new
//! submission cancels whatever is in flight (last submission wins); a
//! superseded run never publishes its outcome.

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::outcome::{PipelineOutcome, Submission};
use super::state::{PipelineState, StateTransition};
use crate::client::{OperationExecutor, QueryParser};
use crate::query::{Enricher, IndexSelector, QueryText, SelectorPolicy};
use crate::view::normalize;

/// Everything a run publishes, guarded together
#[derive(Debug)]
struct RunSlot {
    /// Id of the current (latest) run
    run: u64,
    state: PipelineState,
    transitions: Vec<StateTransition>,
    cancel: Option<CancellationToken>,
    latest: Option<Arc<PipelineOutcome>>,
}

/// The orchestrator - owns the single in-flight query
pub struct Orchestrator {
    parser: Arc<dyn QueryParser>,
    executor: Arc<dyn OperationExecutor>,
    enricher: Enricher,

    /// Selector as the user last set it; read when a run enters enrichment
    selector: RwLock<String>,

    slot: RwLock<RunSlot>,
}

impl Orchestrator {
    pub fn new(parser: Arc<dyn QueryParser>, executor: Arc<dyn OperationExecutor>) -> Self {
        Self {
            parser,
            executor,
            enricher: Enricher::default(),
            selector: RwLock::new(IndexSelector::default().as_str().to_string()),
            slot: RwLock::new(RunSlot {
                run: 0,
                state: PipelineState::Idle,
                transitions: Vec::new(),
                cancel: None,
                latest: None,
            }),
        }
    }

    /// Set how unknown index selectors are handled
    pub fn with_policy(mut self, policy: SelectorPolicy) -> Self {
        self.enricher = Enricher::new(policy);
        self
    }

    /// Set the initial index selector
    pub fn with_selector(self, selector: impl Into<String>) -> Self {
        Self {
            selector: RwLock::new(selector.into()),
            ..self
        }
    }

    pub fn policy(&self) -> SelectorPolicy {
        self.enricher.policy()
    }

    /// Get current state
    pub async fn state(&self) -> PipelineState {
        self.slot.read().await.state
    }

    /// Transitions taken by the current run (cleared when a run starts)
    pub async fn transitions(&self) -> Vec<StateTransition> {
        self.slot.read().await.transitions.clone()
    }

    /// Outcome of the most recent run that finished
    pub async fn latest(&self) -> Option<Arc<PipelineOutcome>> {
        self.slot.read().await.latest.clone()
    }

    pub async fn selector(&self) -> String {
        self.selector.read().await.clone()
    }

    /// Change the index selector. Validation happens at enrichment.
    pub async fn set_selector(&self, selector: impl Into<String>) {
        let selector = selector.into();
        debug!(%selector, "index selector changed");
        *self.selector.write().await = selector;
    }

    /// Cancel the in-flight run, if any. Returns whether one was running.
    pub async fn cancel(&self) -> bool {
        let mut slot = self.slot.write().await;
        if slot.cancel.is_none() {
            return false;
        }

        let run = slot.run;
        info!(run, state = ?slot.state, "run cancelled");
        if slot.state != PipelineState::Idle {
            Self::record(&mut slot, run, PipelineState::Idle);
        }
        if let Some(token) = slot.cancel.take() {
            token.cancel();
        }
        true
    }

    /// Run the full pipeline for `text`.
    ///
    /// Blank text is ignored without touching the services or the state.
    pub async fn submit(&self, text: &str) -> Submission {
        let Some(query) = QueryText::new(text) else {
            debug!("blank query ignored");
            return Submission::Ignored;
        };

        let (run, token) = self.begin().await;
        info!(run, query = %query, "run started");
        self.drive(run, query, token).await
    }

    /// Allocate a run id, superseding any in-flight run
    async fn begin(&self) -> (u64, CancellationToken) {
        let mut slot = self.slot.write().await;
        if let Some(previous) = slot.cancel.take() {
            previous.cancel();
            info!(run = slot.run, "run superseded");
        }

        slot.run += 1;
        let token = CancellationToken::new();
        slot.cancel = Some(token.clone());
        slot.transitions.clear();
        slot.state = PipelineState::Idle;
        (slot.run, token)
    }

    async fn drive(&self, run: u64, query: QueryText, token: CancellationToken) -> Submission {
        if !self.transition(run, PipelineState::Parsing).await {
            return Submission::Cancelled;
        }

        let parsed = tokio::select! {
            biased;
            _ = token.cancelled() => return Submission::Cancelled,
            parsed = self.parser.parse(&query) => parsed,
        };
        let parsed = match parsed {
            Ok(parsed) => parsed,
            Err(error) => {
                return self
                    .finish(run, &token, PipelineOutcome::ParseFailed { query, error })
                    .await;
            }
        };

        if !self.transition(run, PipelineState::Parsed).await
            || !self.transition(run, PipelineState::Enriching).await
        {
            return Submission::Cancelled;
        }

        let selector = self.selector().await;
        let enriched = match self.enricher.enrich(&parsed, &selector) {
            Ok(enriched) => enriched,
            Err(error) => {
                let outcome = PipelineOutcome::ValidationFailed { query, parsed, error };
                return self.finish(run, &token, outcome).await;
            }
        };

        if !self.transition(run, PipelineState::Enriched).await
            || !self.transition(run, PipelineState::Executing).await
        {
            return Submission::Cancelled;
        }

        let result = tokio::select! {
            biased;
            _ = token.cancelled() => return Submission::Cancelled,
            result = self.executor.execute(&enriched) => result,
        };
        let outcome = match result {
            Ok(result) => PipelineOutcome::Completed {
                query,
                parsed,
                enriched,
                view: normalize(&result),
                result,
            },
            Err(error) => PipelineOutcome::ExecutionFailed {
                query,
                parsed,
                enriched,
                error,
            },
        };
        self.finish(run, &token, outcome).await
    }

    /// Move the current run to `to`. False if `run` is no longer current.
    async fn transition(&self, run: u64, to: PipelineState) -> bool {
        let mut slot = self.slot.write().await;
        Self::record(&mut slot, run, to)
    }

    fn record(slot: &mut RunSlot, run: u64, to: PipelineState) -> bool {
        if slot.run != run || slot.cancel.is_none() {
            return false;
        }

        let from = slot.state;
        debug_assert!(from.can_transition_to(to), "{:?} -> {:?}", from, to);
        debug!(run, ?from, ?to, "pipeline transition");
        slot.transitions.push(StateTransition {
            run,
            from,
            to,
            timestamp: Instant::now(),
        });
        slot.state = to;
        true
    }

    /// Publish a terminal outcome and return to `Idle`, in one step
    async fn finish(
        &self,
        run: u64,
        token: &CancellationToken,
        outcome: PipelineOutcome,
    ) -> Submission {
        let mut slot = self.slot.write().await;
        if token.is_cancelled() || slot.run != run {
            debug!(run, "dropping outcome of superseded run");
            return Submission::Cancelled;
        }

        let terminal = outcome.state();
        Self::record(&mut slot, run, terminal);
        Self::record(&mut slot, run, PipelineState::Idle);
        slot.cancel = None;

        let outcome = Arc::new(outcome);
        slot.latest = Some(Arc::clone(&outcome));
        info!(run, state = ?terminal, "run finished");
        Submission::Finished(outcome)
    }
}
