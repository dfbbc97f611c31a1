//! Debate session use case
//!
//! Drives one problem through the five debate stages:
//!
//! 1. Role assessment - every agent scores itself; at least four must answer
//! 2. Solve - the three solvers answer independently
//! 3. Peer review - every solver reviews every other solver's solution
//! 4. Refine - each reviewed solver revises its solution
//! 5. Judge - the judge picks the winning solver
//!
//! Each stage fans out through the [`StageCoordinator`]; the session only
//! advances its [`SessionState`] once a stage's quorum holds.

use super::call_executor::{CallContext, CallExecutor};
use super::recorder::{Recorder, artifact_name, new_record_id};
use super::stage_coordinator::{StageCoordinator, StageResults, UnitError, WorkUnit};
use crate::agent::{Agent, AgentRoster};
use crate::config::ExecutionParams;
use crate::ports::document_store::{ArtifactSink, DocumentStore};
use crate::ports::progress::DebateProgressNotifier;
use debate_domain::{
    AgentId, DebatePrompts, DomainError, Judgment, JudgmentOutput, PeerReviewInput, Problem,
    PromptPair, RecordMeta, RefinedSolution, RefinementInput, RefinementOutput, Review,
    ReviewOutput, RoleAssessment, RoleAssessmentOutput, RoleAssignment, ScoreCard,
    SessionOutcome, SessionReport, SessionState, Solution, SolutionOutput, SolverPanel, SolverSlot,
    Stage, StructuredOutput, UnitFailure, assign_roles,
};
use futures::FutureExt;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{error, info, instrument, warn};

/// Why a session stopped before completing
#[derive(Error, Debug, Clone)]
#[error("{source}")]
pub struct SessionError {
    pub stage: Stage,
    #[source]
    pub source: UnitError,
}

impl SessionError {
    pub fn new(stage: Stage, source: impl Into<UnitError>) -> Self {
        Self {
            stage,
            source: source.into(),
        }
    }
}

/// Collaborators shared by every session of a run
pub struct SessionServices {
    pub executor: CallExecutor,
    pub coordinator: StageCoordinator,
    pub recorder: Recorder,
    pub progress: Arc<dyn DebateProgressNotifier>,
    pub params: ExecutionParams,
}

impl SessionServices {
    pub fn new(
        params: ExecutionParams,
        store: Arc<dyn DocumentStore>,
        artifacts: Arc<dyn ArtifactSink>,
        progress: Arc<dyn DebateProgressNotifier>,
    ) -> Self {
        Self {
            executor: CallExecutor::new(params.call.clone(), Arc::clone(&progress)),
            coordinator: StageCoordinator::new(params.limits.stage_units, Arc::clone(&progress)),
            recorder: Recorder::new(store, artifacts, params.strict_persistence),
            progress,
            params,
        }
    }
}

/// One problem's debate
pub struct DebateSession {
    run_id: String,
    problem: Arc<Problem>,
    roster: Arc<AgentRoster>,
    services: Arc<SessionServices>,
    state: SessionState,
    assignment: Option<RoleAssignment>,
    failures: Vec<UnitFailure>,
    refinement_skipped: Vec<SolverSlot>,
}

impl DebateSession {
    pub fn new(
        run_id: impl Into<String>,
        problem: Arc<Problem>,
        roster: Arc<AgentRoster>,
        services: Arc<SessionServices>,
    ) -> Self {
        Self {
            run_id: run_id.into(),
            problem,
            roster,
            services,
            state: SessionState::Created,
            assignment: None,
            failures: Vec::new(),
            refinement_skipped: Vec::new(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Run every stage and report how the session ended
    #[instrument(skip_all, fields(problem = %self.problem.id))]
    pub async fn run(mut self) -> SessionReport {
        let started = Instant::now();
        info!(run = %self.run_id, "Debate session started");
        self.services.progress.on_session_start(&self.problem.id);
        self.services
            .recorder
            .record_run(&self.run_id, &self.problem.id)
            .await;

        let outcome = match self.drive().await {
            Ok(outcome) => outcome,
            Err(e) => {
                let reason = e.to_string();
                error!(
                    stage = %e.stage,
                    error_kind = e.source.kind(),
                    "Session aborted: {}",
                    reason
                );
                if let Err(transition) = self.state.abort(e.stage, reason.clone()) {
                    warn!("Could not record abort: {}", transition);
                }
                SessionOutcome::Aborted {
                    stage: e.stage,
                    reason,
                }
            }
        };

        let report = SessionReport {
            problem_id: self.problem.id.clone(),
            outcome,
            assignment: self.assignment.take(),
            ground_answer: Some(self.problem.ground_answer.clone()),
            failures: std::mem::take(&mut self.failures),
            refinement_skipped: std::mem::take(&mut self.refinement_skipped),
            elapsed_sec: started.elapsed().as_secs_f64(),
        };
        info!(
            state = self.state.name(),
            elapsed_sec = report.elapsed_sec,
            "Debate session finished"
        );
        self.services.progress.on_session_finished(&report);
        report
    }

    async fn drive(&mut self) -> Result<SessionOutcome, SessionError> {
        let assignment = self.assess_roles().await?;
        let mut panel = self.solve(&assignment).await?;
        self.peer_review(&mut panel).await?;
        self.refine(&mut panel).await?;
        let judgment = self.judge(&assignment, &panel).await?;

        let winner = judgment.winner();
        let final_answer = panel
            .get(winner)
            .refined()
            .map(|r| r.output.refined_answer.clone())
            .unwrap_or_default();
        let answers_changed = panel
            .iter()
            .filter_map(|ctx| ctx.refined())
            .filter(|r| r.output.answer_changed)
            .count();

        self.advance(SessionState::Complete, Stage::Judge)?;
        info!(
            judge = %judgment.judge_id,
            winner = %winner,
            winner_agent = %judgment.winner_agent_id,
            "Debate complete"
        );

        Ok(SessionOutcome::Complete {
            judge: judgment.judge_id,
            winner,
            winner_agent: judgment.winner_agent_id,
            final_answer,
            answers_changed,
        })
    }

    async fn assess_roles(&mut self) -> Result<RoleAssignment, SessionError> {
        let stage = Stage::RoleAssessment;
        let prompts = DebatePrompts::role_assessment(&self.problem);

        let units = self
            .roster
            .iter()
            .map(|agent| {
                let agent_id = agent.id().clone();
                let artifact = artifact_name(&[agent.id().as_str()], &self.problem.id);
                self.call_unit::<RoleAssessmentOutput, _, _>(
                    Arc::clone(agent),
                    stage,
                    prompts.clone(),
                    artifact,
                    move |meta, output| {
                        Ok(RoleAssessment {
                            meta,
                            agent_id,
                            output,
                        })
                    },
                )
            })
            .collect();

        let cards: Vec<ScoreCard> = self
            .run_stage(stage, units)
            .await
            .into_successes()
            .into_iter()
            .map(|(_, a)| ScoreCard::new(a.agent_id, a.output.judge_score, a.output.solver_score))
            .collect();

        let assignment = assign_roles(&cards, &self.services.params.assignment)
            .map_err(|e| SessionError::new(stage, e))?;
        info!(
            judge = %assignment.judge,
            solvers = ?assignment.solvers,
            "Roles assigned"
        );
        self.assignment = Some(assignment.clone());
        self.advance(SessionState::RolesAssigned, stage)?;
        Ok(assignment)
    }

    async fn solve(&mut self, assignment: &RoleAssignment) -> Result<SolverPanel, SessionError> {
        let stage = Stage::Solve;
        let prompts = DebatePrompts::solve(&self.problem);
        let mut panel = SolverPanel::from_assignment(assignment);

        let mut slots = Vec::new();
        let mut units = Vec::new();
        for (slot, agent_id) in assignment.solver_slots() {
            let agent = self.agent(agent_id, stage)?;
            let solver_id = agent_id.clone();
            let artifact = artifact_name(&[agent_id.as_str()], &self.problem.id);
            units.push(self.call_unit::<SolutionOutput, _, _>(
                agent,
                stage,
                prompts.clone(),
                artifact,
                move |meta, output| {
                    Ok(Solution {
                        meta,
                        solver_id,
                        output,
                    })
                },
            ));
            slots.push(slot);
        }

        let results = self.run_stage(stage, units).await;
        for (slot, (agent_id, result)) in slots.into_iter().zip(results.results) {
            if let Ok(solution) = result
                && let Err(e) = panel.get_mut(slot).set_solution(solution)
            {
                self.exclude(stage, &agent_id, e.into());
            }
        }

        self.advance(SessionState::Solved, stage)?;
        Ok(panel)
    }

    async fn peer_review(&mut self, panel: &mut SolverPanel) -> Result<(), SessionError> {
        let stage = Stage::PeerReview;

        if panel.solved_count() < 2 {
            info!(
                solved = panel.solved_count(),
                "Peer review skipped: fewer than two solutions"
            );
            self.advance(SessionState::Reviewed, stage)?;
            return Ok(());
        }

        let pairs = panel.review_pairs();
        let mut reviewees = Vec::with_capacity(pairs.len());
        let mut units = Vec::with_capacity(pairs.len());
        for (reviewer, reviewee) in pairs {
            let reviewer_ctx = panel.get(reviewer);
            let reviewee_ctx = panel.get(reviewee);
            let Some(reviewed) = reviewee_ctx.solution().cloned() else {
                continue;
            };
            let prompts = DebatePrompts::peer_review(&PeerReviewInput {
                problem: self.problem.brief(),
                solution: &reviewed.output,
            });
            let agent = self.agent(reviewer_ctx.agent_id(), stage)?;
            let reviewer_id = reviewer_ctx.agent_id().clone();
            let artifact = artifact_name(
                &[reviewer_ctx.agent_id().as_str(), reviewee_ctx.agent_id().as_str()],
                &self.problem.id,
            );
            units.push(self.call_unit::<ReviewOutput, _, _>(
                agent,
                stage,
                prompts,
                artifact,
                move |meta, output| Review::new(meta, reviewer_id, &reviewed, output),
            ));
            reviewees.push(reviewee);
        }

        let results = self.run_stage(stage, units).await;
        for (reviewee, (agent_id, result)) in reviewees.into_iter().zip(results.results) {
            if let Ok(review) = result
                && let Err(e) = panel.deliver_review(reviewee, review)
            {
                self.exclude(stage, &agent_id, e.into());
            }
        }

        self.advance(SessionState::Reviewed, stage)
    }

    async fn refine(&mut self, panel: &mut SolverPanel) -> Result<(), SessionError> {
        let stage = Stage::Refine;

        let mut slots = Vec::new();
        let mut units = Vec::new();
        for ctx in panel.iter() {
            let Some(input) = RefinementInput::for_context(&self.problem, ctx) else {
                continue;
            };
            let Some(parent) = ctx.solution() else {
                continue;
            };
            let prompts = DebatePrompts::refine(&input);
            let agent = self.agent(ctx.agent_id(), stage)?;
            let solver_id = ctx.agent_id().clone();
            let parent_solution_id = parent.id().to_string();
            let review_ids = ctx.review_ids();
            let artifact = artifact_name(&[ctx.agent_id().as_str()], &self.problem.id);
            units.push(self.call_unit::<RefinementOutput, _, _>(
                agent,
                stage,
                prompts,
                artifact,
                move |meta, output| {
                    Ok(RefinedSolution {
                        meta,
                        solver_id,
                        parent_solution_id,
                        review_ids,
                        output,
                    })
                },
            ));
            slots.push(ctx.slot());
        }

        for ctx in panel.iter_mut() {
            if ctx.solution().is_some() && ctx.reviews().is_empty() {
                info!(solver = %ctx.agent_id(), slot = %ctx.slot(), "Refinement skipped: no reviews received");
                ctx.skip_refinement();
            }
        }
        self.refinement_skipped = panel
            .iter()
            .filter(|ctx| ctx.refinement_skipped())
            .map(|ctx| ctx.slot())
            .collect();

        let results = self.run_stage(stage, units).await;
        for (slot, (agent_id, result)) in slots.into_iter().zip(results.results) {
            if let Ok(refined) = result
                && let Err(e) = panel.get_mut(slot).set_refined(refined)
            {
                self.exclude(stage, &agent_id, e.into());
            }
        }

        self.advance(SessionState::Refined, stage)
    }

    async fn judge(
        &mut self,
        assignment: &RoleAssignment,
        panel: &SolverPanel,
    ) -> Result<Judgment, SessionError> {
        let stage = Stage::Judge;

        let input = panel
            .judgment_input(&self.problem)
            .map_err(|e| SessionError::new(stage, e))?;
        let prompts = DebatePrompts::judge(&input);

        let agent = self.agent(&assignment.judge, stage)?;
        let judge_id = assignment.judge.clone();
        let roles = assignment.clone();
        let artifact = artifact_name(&[assignment.judge.as_str()], &self.problem.id);
        let unit = self.call_unit::<JudgmentOutput, _, _>(
            agent,
            stage,
            prompts,
            artifact,
            move |meta, output| {
                let winner_agent_id = roles.solver(output.winner_solver).clone();
                Ok(Judgment {
                    meta,
                    judge_id,
                    winner_agent_id,
                    output,
                })
            },
        );

        let judgment = match self.run_stage(stage, vec![unit]).await.results.pop() {
            Some((_, Ok(judgment))) => judgment,
            Some((_, Err(e))) => return Err(SessionError::new(stage, e)),
            None => {
                return Err(SessionError::new(
                    stage,
                    UnitError::Aborted("judge unit produced no result".to_string()),
                ));
            }
        };

        self.advance(SessionState::Judged, stage)?;
        Ok(judgment)
    }

    /// Build a unit that calls `agent`, wraps the output into a record and
    /// persists it
    fn call_unit<T, R, F>(
        &self,
        agent: Arc<Agent>,
        stage: Stage,
        prompts: PromptPair,
        artifact: String,
        build: F,
    ) -> WorkUnit<R>
    where
        T: StructuredOutput,
        R: Serialize + Send + Sync + 'static,
        F: FnOnce(RecordMeta, T) -> Result<R, DomainError> + Send + 'static,
    {
        let services = Arc::clone(&self.services);
        let run_id = self.run_id.clone();
        let problem_id = self.problem.id.clone();
        let agent_id = agent.id().clone();

        WorkUnit::new(
            agent_id,
            async move {
                let ctx = CallContext {
                    stage,
                    problem_id: &problem_id,
                };
                let output = services.executor.execute::<T>(&agent, &prompts, ctx).await?;

                let id = new_record_id();
                let meta = RecordMeta::new(id.clone(), run_id, problem_id.clone())
                    .with_prompts(prompts.system, prompts.user)
                    .with_elapsed(output.elapsed.as_secs_f64());
                let record = build(meta, output.value)?;

                services
                    .recorder
                    .record(stage, &id, &artifact, &record)
                    .await?;
                Ok(record)
            }
            .boxed(),
        )
    }

    async fn run_stage<T: Send + 'static>(
        &mut self,
        stage: Stage,
        units: Vec<WorkUnit<T>>,
    ) -> StageResults<T> {
        let results = self
            .services
            .coordinator
            .run_stage(stage, &self.problem.id, units)
            .await;
        self.failures.extend(results.failures());
        results
    }

    fn agent(&self, id: &AgentId, stage: Stage) -> Result<Arc<Agent>, SessionError> {
        self.roster.get(id).cloned().ok_or_else(|| {
            SessionError::new(
                stage,
                DomainError::RoleIntegrity(format!("agent '{}' is not in the roster", id)),
            )
        })
    }

    fn advance(&mut self, next: SessionState, stage: Stage) -> Result<(), SessionError> {
        self.state
            .advance(next)
            .map_err(|e| SessionError::new(stage, e))
    }

    /// Drop a unit whose output broke a role invariant
    fn exclude(&mut self, stage: Stage, agent_id: &AgentId, error: UnitError) {
        warn!(
            agent = %agent_id,
            stage = %stage,
            problem = %self.problem.id,
            error_kind = error.kind(),
            "Unit excluded: {}",
            error
        );
        self.failures.push(UnitFailure {
            stage,
            agent_id: agent_id.clone(),
            error_kind: error.kind().to_string(),
            message: error.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CallPolicy;
    use crate::ports::document_store::{MemoryDocumentStore, NoArtifacts, StoreError};
    use crate::ports::progress::NoProgress;
    use crate::ports::provider::{ProviderOutcome, ProviderRequest};
    use crate::testing::{MockProvider, agent, reference_roster, stage_reply};
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::collections::BTreeSet;
    use std::time::Duration;

    const SCORES: [(&str, f64, f64); 4] =
        [("A", 0.9, 0.1), ("B", 0.2, 0.8), ("C", 0.3, 0.7), ("D", 0.4, 0.6)];

    fn params() -> ExecutionParams {
        ExecutionParams::default().with_call_policy(
            CallPolicy::default()
                .with_post_call_delay(Duration::ZERO)
                .with_heartbeat_interval(Duration::ZERO)
                .with_max_retries(1),
        )
    }

    fn services(params: ExecutionParams, store: Arc<dyn DocumentStore>) -> Arc<SessionServices> {
        Arc::new(SessionServices::new(
            params,
            store,
            Arc::new(NoArtifacts),
            Arc::new(NoProgress),
        ))
    }

    fn problem() -> Arc<Problem> {
        Arc::new(Problem::new("p1", "Arithmetic", "What is 6 * 7?", "42", "easy"))
    }

    /// Reference roster where `fail` may override any agent's reply
    fn roster_with<F>(fail: F) -> AgentRoster
    where
        F: Fn(&str, &ProviderRequest) -> Option<ProviderOutcome> + Send + Sync + Clone + 'static,
    {
        let agents = SCORES
            .iter()
            .map(|&(id, judge, solver)| {
                let fail = fail.clone();
                let provider = MockProvider::new(move |r| {
                    fail(id, r).unwrap_or_else(|| stage_reply(r, judge, solver))
                });
                agent(id, Arc::new(provider))
            })
            .collect();
        AgentRoster::new(agents)
    }

    async fn run(roster: AgentRoster, store: Arc<MemoryDocumentStore>) -> SessionReport {
        DebateSession::new("run-1", problem(), Arc::new(roster), services(params(), store))
            .run()
            .await
    }

    fn docs(store: &MemoryDocumentStore, collection: &str) -> Vec<Value> {
        store
            .documents()
            .into_iter()
            .filter(|d| d.collection == collection)
            .map(|d| d.document)
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_reference_debate_completes() {
        let (roster, providers) = reference_roster(Duration::from_millis(10));
        let store = Arc::new(MemoryDocumentStore::new());
        let report = run(roster, store.clone()).await;

        let assignment = report.assignment.clone().unwrap();
        assert_eq!(assignment.judge, AgentId::new("A"));
        assert_eq!(
            assignment.solvers,
            [AgentId::new("B"), AgentId::new("C"), AgentId::new("D")]
        );
        assert_eq!(
            report.outcome,
            SessionOutcome::Complete {
                judge: AgentId::new("A"),
                winner: SolverSlot::Two,
                winner_agent: AgentId::new("C"),
                final_answer: "42".into(),
                answers_changed: 0,
            }
        );
        assert!(report.failures.is_empty());
        assert_eq!(report.matches_ground_truth(), Some(true));

        assert_eq!(store.count("Runs"), 1);
        assert_eq!(store.count("RoleAssessments"), 4);
        assert_eq!(store.count("Solutions"), 3);
        assert_eq!(store.count("SolutionReviews"), 6);
        assert_eq!(store.count("RefinedSolutions"), 3);
        assert_eq!(store.count("FinalJudgements"), 1);

        // The judge only assesses and judges; each solver makes 1 + 1 + 2 + 1 calls
        assert_eq!(providers[0].call_count(), 2);
        for solver in &providers[1..] {
            assert_eq!(solver.call_count(), 5);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_refinement_uses_reviews_addressed_to_solver() {
        let (roster, _) = reference_roster(Duration::ZERO);
        let store = Arc::new(MemoryDocumentStore::new());
        run(roster, store.clone()).await;

        let reviews = docs(&store, "SolutionReviews");
        let for_b: Vec<&Value> = reviews.iter().filter(|r| r["reviewee_id"] == "B").collect();
        let reviewers: BTreeSet<&str> = for_b
            .iter()
            .filter_map(|r| r["reviewer_id"].as_str())
            .collect();
        assert_eq!(reviewers, BTreeSet::from(["C", "D"]));
        assert!(reviews.iter().all(|r| r["reviewer_id"] != r["reviewee_id"]));

        let refined = docs(&store, "RefinedSolutions");
        let b_refined = refined.iter().find(|r| r["solver_id"] == "B").unwrap();
        let review_ids: BTreeSet<&str> = b_refined["review_ids"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        let expected: BTreeSet<&str> = for_b.iter().filter_map(|r| r["id"].as_str()).collect();
        assert_eq!(review_ids, expected);

        let solutions = docs(&store, "Solutions");
        let b_solution = solutions.iter().find(|s| s["solver_id"] == "B").unwrap();
        assert_eq!(b_refined["parent_solution_id"], b_solution["id"]);
        assert_eq!(b_refined["run_id"], "run-1");
        assert!(b_refined["prompt_user"].as_str().unwrap().contains("reviews"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_assessment_quorum_failure_aborts() {
        let roster = roster_with(|id, r| {
            (id == "D" && r.schema_name == "role_assessment")
                .then(|| ProviderOutcome::Fatal("insufficient quota".into()))
        });
        let store = Arc::new(MemoryDocumentStore::new());
        let report = run(roster, store.clone()).await;

        match &report.outcome {
            SessionOutcome::Aborted { stage, reason } => {
                assert_eq!(*stage, Stage::RoleAssessment);
                assert!(reason.contains('4'), "reason should name the quorum: {}", reason);
            }
            other => panic!("expected abort, got {:?}", other),
        }
        assert!(report.assignment.is_none());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].agent_id, AgentId::new("D"));
        assert_eq!(report.failures[0].error_kind, "fatal_provider_error");
        assert_eq!(store.count("Solutions"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_solver_skips_review_and_aborts_at_judge() {
        let roster = roster_with(|id, r| {
            (id == "B" && r.schema_name == "problem_solution")
                .then(|| ProviderOutcome::Retryable("HTTP 503".into()))
        });
        let store = Arc::new(MemoryDocumentStore::new());
        let report = run(roster, store.clone()).await;

        assert_eq!(store.count("Solutions"), 2);
        // Only C and D review each other
        assert_eq!(store.count("SolutionReviews"), 2);
        assert_eq!(store.count("RefinedSolutions"), 2);
        assert_eq!(store.count("FinalJudgements"), 0);
        match &report.outcome {
            SessionOutcome::Aborted { stage, reason } => {
                assert_eq!(*stage, Stage::Judge);
                assert!(reason.contains("Solver 1"), "unexpected reason: {}", reason);
            }
            other => panic!("expected abort, got {:?}", other),
        }
        assert_eq!(report.failures[0].stage, Stage::Solve);
        assert_eq!(report.failures[0].error_kind, "retries_exhausted");
    }

    #[tokio::test(start_paused = true)]
    async fn test_lone_solution_skips_review_and_refinement() {
        let roster = roster_with(|id, r| {
            (matches!(id, "C" | "D") && r.schema_name == "problem_solution")
                .then(|| ProviderOutcome::Retryable("HTTP 500".into()))
        });
        let store = Arc::new(MemoryDocumentStore::new());
        let report = run(roster, store.clone()).await;

        assert_eq!(store.count("SolutionReviews"), 0);
        assert_eq!(store.count("RefinedSolutions"), 0);
        assert_eq!(report.refinement_skipped, vec![SolverSlot::One]);
        assert!(matches!(
            report.outcome,
            SessionOutcome::Aborted {
                stage: Stage::Judge,
                ..
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_reviewer_leaves_partial_reviews() {
        let roster = roster_with(|id, r| {
            (id == "D" && r.schema_name == "problem_solution_review")
                .then(|| ProviderOutcome::Ok(json!({"unexpected": true})))
        });
        let store = Arc::new(MemoryDocumentStore::new());
        let report = run(roster, store.clone()).await;

        assert!(report.outcome.is_complete());
        assert_eq!(store.count("SolutionReviews"), 4);
        let refined = docs(&store, "RefinedSolutions");
        let b_refined = refined.iter().find(|r| r["solver_id"] == "B").unwrap();
        assert_eq!(b_refined["review_ids"].as_array().unwrap().len(), 1);
        let d_refined = refined.iter().find(|r| r["solver_id"] == "D").unwrap();
        assert_eq!(d_refined["review_ids"].as_array().unwrap().len(), 2);
        assert_eq!(
            report
                .failures
                .iter()
                .filter(|f| f.error_kind == "retries_exhausted")
                .count(),
            2
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_unreviewed_solver_reported_as_refinement_skipped() {
        // B and C never deliver a review, so only D reviews and nobody reviews D
        let roster = roster_with(|id, r| {
            (matches!(id, "B" | "C") && r.schema_name == "problem_solution_review")
                .then(|| ProviderOutcome::Retryable("HTTP 500".into()))
        });
        let store = Arc::new(MemoryDocumentStore::new());
        let report = run(roster, store.clone()).await;

        assert_eq!(store.count("SolutionReviews"), 2);
        assert_eq!(store.count("RefinedSolutions"), 2);
        assert_eq!(report.refinement_skipped, vec![SolverSlot::Three]);
        assert!(matches!(
            report.outcome,
            SessionOutcome::Aborted {
                stage: Stage::Judge,
                ..
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_judge_failure_aborts() {
        let roster = roster_with(|id, r| {
            (id == "A" && r.schema_name == "final_judgement")
                .then(|| ProviderOutcome::Fatal("billing account suspended".into()))
        });
        let store = Arc::new(MemoryDocumentStore::new());
        let report = run(roster, store.clone()).await;

        assert_eq!(store.count("RefinedSolutions"), 3);
        assert!(matches!(
            report.outcome,
            SessionOutcome::Aborted {
                stage: Stage::Judge,
                ..
            }
        ));
        assert_eq!(report.failures.last().unwrap().agent_id, AgentId::new("A"));
    }

    struct BrokenStore;

    #[async_trait]
    impl DocumentStore for BrokenStore {
        async fn write(&self, _: &str, _: &Value, _: Option<&str>) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_persistence_failure_is_tolerated_unless_strict() {
        let (roster, _) = reference_roster(Duration::ZERO);
        let lenient = DebateSession::new(
            "run-1",
            problem(),
            Arc::new(roster),
            services(params(), Arc::new(BrokenStore)),
        )
        .run()
        .await;
        assert!(lenient.outcome.is_complete());

        let (roster, _) = reference_roster(Duration::ZERO);
        let strict = DebateSession::new(
            "run-1",
            problem(),
            Arc::new(roster),
            services(params().with_strict_persistence(true), Arc::new(BrokenStore)),
        )
        .run()
        .await;
        assert!(matches!(
            strict.outcome,
            SessionOutcome::Aborted {
                stage: Stage::RoleAssessment,
                ..
            }
        ));
        assert!(
            strict
                .failures
                .iter()
                .all(|f| f.error_kind == "persistence_error")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_state_reaches_complete() {
        let (roster, _) = reference_roster(Duration::ZERO);
        let mut session = DebateSession::new(
            "run-1",
            problem(),
            Arc::new(roster),
            services(params(), Arc::new(MemoryDocumentStore::new())),
        );
        assert_eq!(session.state(), &SessionState::Created);
        let outcome = session.drive().await.unwrap();
        assert!(outcome.is_complete());
        assert_eq!(session.state(), &SessionState::Complete);
    }
}
