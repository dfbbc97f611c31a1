//! Stage coordinator
//!
//! Bounded fan-out/fan-in for the units of one stage. Every unit is
//! launched; at most `limit` run at once. A failing or panicking unit is
//! recorded and logged but never cancels its siblings. Results come back
//! in input order so callers can zip them with the units they submitted.

use super::call_executor::CallError;
use crate::ports::document_store::StoreError;
use crate::ports::progress::DebateProgressNotifier;
use debate_domain::{AgentId, DomainError, Stage, UnitFailure};
use futures::FutureExt;
use futures::future::BoxFuture;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// Why a unit was excluded from its stage
#[derive(Error, Debug, Clone)]
pub enum UnitError {
    #[error(transparent)]
    Call(#[from] CallError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Persistence failed: {0}")]
    Persistence(#[from] StoreError),

    #[error("Unit aborted: {0}")]
    Aborted(String),
}

impl UnitError {
    pub fn kind(&self) -> &'static str {
        match self {
            UnitError::Call(e) => e.kind(),
            UnitError::Domain(e) => e.kind(),
            UnitError::Persistence(_) => "persistence_error",
            UnitError::Aborted(_) => "aborted",
        }
    }
}

/// One independent piece of work within a stage
pub struct WorkUnit<T> {
    pub agent_id: AgentId,
    pub work: BoxFuture<'static, Result<T, UnitError>>,
}

impl<T> WorkUnit<T> {
    pub fn new(agent_id: AgentId, work: BoxFuture<'static, Result<T, UnitError>>) -> Self {
        Self { agent_id, work }
    }
}

/// Per-unit results of one stage, in submission order
pub struct StageResults<T> {
    pub stage: Stage,
    pub results: Vec<(AgentId, Result<T, UnitError>)>,
}

impl<T> StageResults<T> {
    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|(_, r)| r.is_ok()).count()
    }

    pub fn failures(&self) -> Vec<UnitFailure> {
        self.results
            .iter()
            .filter_map(|(agent_id, r)| {
                r.as_ref().err().map(|e| UnitFailure {
                    stage: self.stage,
                    agent_id: agent_id.clone(),
                    error_kind: e.kind().to_string(),
                    message: e.to_string(),
                })
            })
            .collect()
    }

    /// Successful values, in submission order
    pub fn into_successes(self) -> Vec<(AgentId, T)> {
        self.results
            .into_iter()
            .filter_map(|(agent_id, r)| r.ok().map(|v| (agent_id, v)))
            .collect()
    }
}

pub struct StageCoordinator {
    limit: usize,
    progress: Arc<dyn DebateProgressNotifier>,
}

impl StageCoordinator {
    pub fn new(limit: usize, progress: Arc<dyn DebateProgressNotifier>) -> Self {
        Self {
            limit: limit.max(1),
            progress,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Run every unit to completion under the concurrency limit
    pub async fn run_stage<T: Send + 'static>(
        &self,
        stage: Stage,
        problem_id: &str,
        units: Vec<WorkUnit<T>>,
    ) -> StageResults<T> {
        info!(problem = problem_id, stage = %stage, units = units.len(), "Stage started");
        self.progress.on_stage_start(problem_id, stage, units.len());

        let semaphore = Arc::new(Semaphore::new(self.limit));
        let mut slots: Vec<(AgentId, Option<Result<T, UnitError>>)> = Vec::with_capacity(units.len());
        let mut join_set = JoinSet::new();

        for (index, unit) in units.into_iter().enumerate() {
            slots.push((unit.agent_id, None));
            let semaphore = Arc::clone(&semaphore);
            let work = unit.work;

            join_set.spawn(async move {
                let result = match semaphore.acquire_owned().await {
                    Ok(_permit) => match AssertUnwindSafe(work).catch_unwind().await {
                        Ok(result) => result,
                        Err(_) => Err(UnitError::Aborted("unit panicked".to_string())),
                    },
                    Err(e) => Err(UnitError::Aborted(e.to_string())),
                };
                (index, result)
            });
        }

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, result)) => {
                    let (agent_id, slot) = &mut slots[index];
                    let success = result.is_ok();
                    if let Err(e) = &result {
                        warn!(
                            agent = %agent_id,
                            stage = %stage,
                            problem = problem_id,
                            error_kind = e.kind(),
                            "Unit excluded: {}",
                            e
                        );
                    }
                    self.progress
                        .on_unit_complete(problem_id, stage, agent_id, success);
                    *slot = Some(result);
                }
                Err(e) => {
                    warn!(stage = %stage, problem = problem_id, "Task join error: {}", e);
                }
            }
        }

        let results = slots
            .into_iter()
            .map(|(agent_id, slot)| {
                let result = slot
                    .unwrap_or_else(|| Err(UnitError::Aborted("task did not complete".to_string())));
                (agent_id, result)
            })
            .collect::<Vec<_>>();

        let outcome = StageResults { stage, results };
        info!(
            problem = problem_id,
            stage = %stage,
            succeeded = outcome.success_count(),
            failed = outcome.results.len() - outcome.success_count(),
            "Stage finished"
        );
        self.progress.on_stage_complete(problem_id, stage);
        outcome
    }
}
