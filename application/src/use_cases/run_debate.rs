//! Run Debate use case
//!
//! Runs one [`DebateSession`] per problem under a run-wide session limit.
//! Sessions are independent: an aborted session never affects the others,
//! and the report lists every problem in input order.

use super::debate_session::{DebateSession, SessionServices};
use crate::agent::AgentRoster;
use crate::config::ExecutionParams;
use crate::ports::document_store::{ArtifactSink, DocumentStore};
use crate::ports::progress::DebateProgressNotifier;
use chrono::Utc;
use debate_domain::{MIN_PARTICIPANTS, ProblemSet, RunReport, SessionReport};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Errors that prevent a run from starting
#[derive(Error, Debug)]
pub enum RunDebateError {
    #[error("Roster has {available} agent(s); a debate needs at least {required}")]
    RosterTooSmall { available: usize, required: usize },

    #[error("No problems to debate")]
    NoProblems,
}

/// Input for the RunDebate use case
#[derive(Debug, Clone)]
pub struct RunDebateInput {
    pub problems: ProblemSet,
    /// Identifier stamped on every record; generated when absent
    pub run_id: Option<String>,
}

impl RunDebateInput {
    pub fn new(problems: ProblemSet) -> Self {
        Self {
            problems,
            run_id: None,
        }
    }

    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = Some(run_id.into());
        self
    }
}

/// Use case for debating a problem set
pub struct RunDebateUseCase {
    roster: Arc<AgentRoster>,
    services: Arc<SessionServices>,
    cancel: CancellationToken,
}

impl RunDebateUseCase {
    pub fn new(
        roster: AgentRoster,
        params: ExecutionParams,
        store: Arc<dyn DocumentStore>,
        artifacts: Arc<dyn ArtifactSink>,
        progress: Arc<dyn DebateProgressNotifier>,
    ) -> Self {
        Self {
            roster: Arc::new(roster),
            services: Arc::new(SessionServices::new(params, store, artifacts, progress)),
            cancel: CancellationToken::new(),
        }
    }

    /// Stop launching sessions once `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub async fn execute(&self, input: RunDebateInput) -> Result<RunReport, RunDebateError> {
        if self.roster.len() < MIN_PARTICIPANTS {
            return Err(RunDebateError::RosterTooSmall {
                available: self.roster.len(),
                required: MIN_PARTICIPANTS,
            });
        }
        if input.problems.is_empty() {
            return Err(RunDebateError::NoProblems);
        }

        let run_id = input
            .run_id
            .unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string());
        let started_at = Utc::now().to_rfc3339();
        let session_limit = self.services.params.limits.sessions.max(1);
        let problems = input.problems.into_vec();

        info!(
            run = %run_id,
            problems = problems.len(),
            agents = self.roster.len(),
            session_limit,
            "Debate run started"
        );

        let semaphore = Arc::new(Semaphore::new(session_limit));
        let mut reports: Vec<Option<SessionReport>> = vec![None; problems.len()];
        let mut problem_ids = Vec::with_capacity(problems.len());
        let mut join_set = JoinSet::new();

        for (index, problem) in problems.into_iter().enumerate() {
            problem_ids.push(problem.id.clone());
            let problem = Arc::new(problem);
            let semaphore = Arc::clone(&semaphore);
            let cancel = self.cancel.clone();
            let session = DebateSession::new(
                run_id.clone(),
                Arc::clone(&problem),
                Arc::clone(&self.roster),
                Arc::clone(&self.services),
            );

            join_set.spawn(async move {
                let permit = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => None,
                    permit = semaphore.acquire_owned() => permit.ok(),
                };
                let report = match permit {
                    Some(_permit) if !cancel.is_cancelled() => session.run().await,
                    _ => {
                        info!(problem = %problem.id, "Session not started: run cancelled");
                        SessionReport::cancelled(problem.id.clone())
                    }
                };
                (index, report)
            });
        }

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, report)) => reports[index] = Some(report),
                Err(e) => warn!(run = %run_id, "Session task failed: {}", e),
            }
        }

        let sessions: Vec<SessionReport> = reports
            .into_iter()
            .zip(problem_ids)
            .map(|(report, problem_id)| {
                report.unwrap_or_else(|| SessionReport::cancelled(problem_id))
            })
            .collect();

        let report = RunReport {
            run_id,
            started_at,
            sessions,
        };
        info!(
            run = %report.run_id,
            completed = report.completed(),
            aborted = report.aborted(),
            cancelled = report.cancelled(),
            correct = report.correct(),
            "Debate run finished"
        );
        Ok(report)
    }
}
