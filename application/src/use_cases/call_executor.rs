//! Call executor
//!
//! Runs one structured call against one agent under a timeout, with a
//! heartbeat while the provider works, bounded retries with `2^attempt`
//! second backoff, immediate give-up on fatal errors, and a single
//! cool-down after the terminal outcome.

use crate::agent::Agent;
use crate::config::CallPolicy;
use crate::ports::progress::DebateProgressNotifier;
use crate::ports::provider::{ProviderOutcome, ProviderRequest};
use debate_domain::{PromptPair, Stage, StructuredOutput};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, instrument, warn};

/// Errors from a single structured call
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CallError {
    #[error("Call timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("Transient provider error: {0}")]
    Transient(String),

    #[error("Fatal provider error: {0}")]
    Fatal(String),

    #[error("Invalid structured output: {0}")]
    Validation(String),

    #[error("Retries exhausted after {attempts} attempt(s): {last}")]
    RetriesExhausted { attempts: u32, last: Box<CallError> },
}

impl CallError {
    pub fn kind(&self) -> &'static str {
        match self {
            CallError::Timeout(_) => "timeout",
            CallError::Transient(_) => "transient_provider_error",
            CallError::Fatal(_) => "fatal_provider_error",
            CallError::Validation(_) => "validation_error",
            CallError::RetriesExhausted { .. } => "retries_exhausted",
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, CallError::Fatal(_))
    }
}

/// What to do after a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Retry { backoff: Duration },
    GiveUp,
}

/// Retry decision after the failed attempt with zero-based index `attempt`
pub fn decide_retry(policy: &CallPolicy, attempt: u32, error: &CallError) -> RetryDecision {
    if error.is_fatal() || attempt + 1 >= policy.max_retries.max(1) {
        RetryDecision::GiveUp
    } else {
        RetryDecision::Retry {
            backoff: policy.backoff(attempt),
        }
    }
}

/// Where a call belongs, for diagnostics and heartbeats
#[derive(Debug, Clone, Copy)]
pub struct CallContext<'a> {
    pub stage: Stage,
    pub problem_id: &'a str,
}

/// A successfully parsed and validated output
#[derive(Debug, Clone)]
pub struct CallOutput<T> {
    pub value: T,
    /// Wall-clock time from the first attempt to success, excluding cool-down
    pub elapsed: Duration,
    pub attempts: u32,
}

/// Periodic ticker owned by one attempt
///
/// Dropping it stops the heartbeat, so it cannot outlive the attempt.
struct Heartbeat {
    interval: Option<Interval>,
}

impl Heartbeat {
    fn start(period: Duration) -> Self {
        if period.is_zero() {
            return Self { interval: None };
        }
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self {
            interval: Some(interval),
        }
    }

    async fn tick(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
    }
}

fn parse_output<T: StructuredOutput>(value: Value) -> Result<T, CallError> {
    let output: T =
        serde_json::from_value(value).map_err(|e| CallError::Validation(e.to_string()))?;
    output.validate().map_err(CallError::Validation)?;
    Ok(output)
}

pub struct CallExecutor {
    policy: CallPolicy,
    progress: Arc<dyn DebateProgressNotifier>,
}

impl CallExecutor {
    pub fn new(policy: CallPolicy, progress: Arc<dyn DebateProgressNotifier>) -> Self {
        Self { policy, progress }
    }

    pub fn policy(&self) -> &CallPolicy {
        &self.policy
    }

    /// Run one structured call to its terminal outcome
    ///
    /// A disabled agent fails immediately, without contacting the provider
    /// and without cool-down.
    #[instrument(skip_all, fields(agent = %agent.id(), stage = %ctx.stage, problem = ctx.problem_id))]
    pub async fn execute<T: StructuredOutput>(
        &self,
        agent: &Agent,
        prompts: &PromptPair,
        ctx: CallContext<'_>,
    ) -> Result<CallOutput<T>, CallError> {
        if let Some(reason) = agent.disabled_reason() {
            return Err(CallError::Fatal(format!(
                "agent disabled earlier in the run: {}",
                reason
            )));
        }

        let request = agent.request::<T>(prompts);
        let result = self.run_attempts::<T>(agent, &request, ctx).await;

        if let Err(e) = &result
            && e.is_fatal()
        {
            agent.disable(e.to_string());
        }

        if !self.policy.post_call_delay.is_zero() {
            tokio::time::sleep(self.policy.post_call_delay).await;
        }

        result
    }

    async fn run_attempts<T: StructuredOutput>(
        &self,
        agent: &Agent,
        request: &ProviderRequest,
        ctx: CallContext<'_>,
    ) -> Result<CallOutput<T>, CallError> {
        let started = Instant::now();
        let mut attempt: u32 = 0;

        loop {
            let error = match self.attempt::<T>(agent, request, ctx, started).await {
                Ok(value) => {
                    let elapsed = started.elapsed();
                    debug!(
                        attempts = attempt + 1,
                        elapsed_sec = elapsed.as_secs_f64(),
                        "Call succeeded"
                    );
                    return Ok(CallOutput {
                        value,
                        elapsed,
                        attempts: attempt + 1,
                    });
                }
                Err(error) => error,
            };

            match &error {
                CallError::Timeout(limit) => {
                    warn!(attempt = attempt + 1, "Attempt timed out after {}s", limit.as_secs())
                }
                other => warn!(
                    attempt = attempt + 1,
                    error_kind = other.kind(),
                    "Attempt failed: {}",
                    other
                ),
            }

            match decide_retry(&self.policy, attempt, &error) {
                RetryDecision::Retry { backoff } => {
                    debug!(backoff_sec = backoff.as_secs(), "Retrying after backoff");
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                RetryDecision::GiveUp if error.is_fatal() => return Err(error),
                RetryDecision::GiveUp => {
                    return Err(CallError::RetriesExhausted {
                        attempts: attempt + 1,
                        last: Box::new(error),
                    });
                }
            }
        }
    }

    async fn attempt<T: StructuredOutput>(
        &self,
        agent: &Agent,
        request: &ProviderRequest,
        ctx: CallContext<'_>,
        started: Instant,
    ) -> Result<T, CallError> {
        let call = tokio::time::timeout(self.policy.timeout, agent.client().submit(request));
        tokio::pin!(call);
        let mut heartbeat = Heartbeat::start(self.policy.heartbeat_interval);

        let outcome = loop {
            tokio::select! {
                biased;
                result = &mut call => break result,
                _ = heartbeat.tick() => {
                    let elapsed = started.elapsed();
                    info!(elapsed_sec = elapsed.as_secs_f64(), "Still waiting for provider");
                    self.progress.on_heartbeat(ctx.problem_id, ctx.stage, agent.id(), elapsed);
                }
            }
        };
        drop(heartbeat);

        match outcome {
            Err(_) => Err(CallError::Timeout(self.policy.timeout)),
            Ok(ProviderOutcome::Ok(value)) => parse_output(value),
            Ok(ProviderOutcome::Retryable(message)) => Err(CallError::Transient(message)),
            Ok(ProviderOutcome::Fatal(message)) => Err(CallError::Fatal(message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::progress::NoProgress;
    use crate::testing::{MockProvider, agent};
    use debate_domain::{AgentId, RoleAssessmentOutput, SessionReport};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn prompts() -> PromptPair {
        PromptPair {
            system: "system".into(),
            user: "user".into(),
        }
    }

    fn ctx() -> CallContext<'static> {
        CallContext {
            stage: Stage::RoleAssessment,
            problem_id: "p1",
        }
    }

    fn assessment() -> ProviderOutcome {
        ProviderOutcome::Ok(json!({
            "judge_score": 0.6,
            "solver_score": 0.3,
            "reasoning": "fits"
        }))
    }

    fn quick_policy() -> CallPolicy {
        CallPolicy::default()
            .with_post_call_delay(Duration::ZERO)
            .with_heartbeat_interval(Duration::ZERO)
    }

    fn executor(policy: CallPolicy) -> CallExecutor {
        CallExecutor::new(policy, Arc::new(NoProgress))
    }

    #[derive(Default)]
    struct CountingProgress {
        heartbeats: AtomicUsize,
    }

    impl DebateProgressNotifier for CountingProgress {
        fn on_stage_start(&self, _: &str, _: Stage, _: usize) {}
        fn on_unit_complete(&self, _: &str, _: Stage, _: &AgentId, _: bool) {}
        fn on_stage_complete(&self, _: &str, _: Stage) {}
        fn on_heartbeat(&self, _: &str, _: Stage, _: &AgentId, _: Duration) {
            self.heartbeats.fetch_add(1, Ordering::SeqCst);
        }
        fn on_session_finished(&self, _: &SessionReport) {}
    }

    #[test]
    fn test_retry_decisions() {
        let policy = CallPolicy::default();
        let transient = CallError::Transient("503".into());
        assert_eq!(
            decide_retry(&policy, 0, &transient),
            RetryDecision::Retry {
                backoff: Duration::from_secs(1)
            }
        );
        assert_eq!(
            decide_retry(&policy, 1, &transient),
            RetryDecision::Retry {
                backoff: Duration::from_secs(2)
            }
        );
        assert_eq!(decide_retry(&policy, 2, &transient), RetryDecision::GiveUp);
        assert_eq!(
            decide_retry(&policy, 0, &CallError::Fatal("quota".into())),
            RetryDecision::GiveUp
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_first_attempt() {
        let provider = Arc::new(MockProvider::scripted(vec![assessment()]));
        let agent = agent("a", provider.clone());
        let output = executor(quick_policy())
            .execute::<RoleAssessmentOutput>(&agent, &prompts(), ctx())
            .await
            .unwrap();
        assert_eq!(output.attempts, 1);
        assert_eq!(output.value.judge_score, 0.6);
        assert_eq!(provider.call_count(), 1);

        let request = &provider.requests()[0];
        assert_eq!(request.schema_name, "role_assessment");
        assert_eq!(request.system_prompt, "system");
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_is_one_then_two_seconds() {
        let provider = Arc::new(MockProvider::scripted(vec![
            ProviderOutcome::Retryable("503".into()),
            ProviderOutcome::Retryable("502".into()),
            assessment(),
        ]));
        let agent = agent("a", provider.clone());
        let output = executor(quick_policy())
            .execute::<RoleAssessmentOutput>(&agent, &prompts(), ctx())
            .await
            .unwrap();
        assert_eq!(output.attempts, 3);

        let times = provider.call_times();
        assert_eq!(times.len(), 3);
        assert_eq!(times[1] - times[0], Duration::from_secs(1));
        assert_eq!(times[2] - times[1], Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_exhausted_keeps_last_error() {
        let provider = Arc::new(MockProvider::scripted(vec![
            ProviderOutcome::Retryable("first".into()),
            ProviderOutcome::Retryable("second".into()),
            ProviderOutcome::Retryable("third".into()),
            assessment(),
        ]));
        let agent = agent("a", provider.clone());
        let err = executor(quick_policy())
            .execute::<RoleAssessmentOutput>(&agent, &prompts(), ctx())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            CallError::RetriesExhausted {
                attempts: 3,
                last: Box::new(CallError::Transient("third".into()))
            }
        );
        assert_eq!(provider.call_count(), 3);
        assert!(!agent.is_disabled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fatal_error_is_not_retried_and_disables_agent() {
        let provider = Arc::new(MockProvider::scripted(vec![
            ProviderOutcome::from_error_message("Insufficient credits on account"),
            assessment(),
        ]));
        let agent = agent("a", provider.clone());
        let exec = executor(quick_policy().with_post_call_delay(Duration::from_secs(5)));

        let started = Instant::now();
        let err = exec
            .execute::<RoleAssessmentOutput>(&agent, &prompts(), ctx())
            .await
            .unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(provider.call_count(), 1);
        assert!(agent.is_disabled());
        assert_eq!(started.elapsed(), Duration::from_secs(5));

        let again = Instant::now();
        let err = exec
            .execute::<RoleAssessmentOutput>(&agent, &prompts(), ctx())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "fatal_provider_error");
        assert_eq!(provider.call_count(), 1);
        assert_eq!(again.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_counts_as_attempt() {
        let provider = Arc::new(
            MockProvider::new(|_| assessment()).with_latency(Duration::from_secs(100)),
        );
        let agent = agent("a", provider.clone());
        let policy = quick_policy()
            .with_timeout(Duration::from_secs(10))
            .with_max_retries(2);

        let started = Instant::now();
        let err = executor(policy)
            .execute::<RoleAssessmentOutput>(&agent, &prompts(), ctx())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            CallError::RetriesExhausted {
                attempts: 2,
                last: Box::new(CallError::Timeout(Duration::from_secs(10)))
            }
        );
        // two 10s attempts with a 1s backoff between them
        assert_eq!(started.elapsed(), Duration::from_secs(21));
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_validation_failure_is_retried() {
        let provider = Arc::new(MockProvider::scripted(vec![
            ProviderOutcome::Ok(json!({"judge_score": 1.5, "solver_score": 0.2, "reasoning": "x"})),
            ProviderOutcome::Ok(json!({"unexpected": true})),
            assessment(),
        ]));
        let agent = agent("a", provider.clone());
        let output = executor(quick_policy())
            .execute::<RoleAssessmentOutput>(&agent, &prompts(), ctx())
            .await
            .unwrap();
        assert_eq!(output.attempts, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_post_call_delay_applied_once() {
        let provider = Arc::new(MockProvider::scripted(vec![
            ProviderOutcome::Retryable("503".into()),
            assessment(),
        ]));
        let agent = agent("a", provider.clone());
        let policy = quick_policy().with_post_call_delay(Duration::from_secs(5));

        let started = Instant::now();
        let output = executor(policy)
            .execute::<RoleAssessmentOutput>(&agent, &prompts(), ctx())
            .await
            .unwrap();
        // 1s backoff + 5s cool-down; elapsed excludes the cool-down
        assert_eq!(started.elapsed(), Duration::from_secs(6));
        assert_eq!(output.elapsed, Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_heartbeat_stops_with_call() {
        let provider = Arc::new(
            MockProvider::new(|_| assessment()).with_latency(Duration::from_secs(25)),
        );
        let agent = agent("a", provider.clone());
        let progress = Arc::new(CountingProgress::default());
        let exec = CallExecutor::new(
            CallPolicy::default()
                .with_heartbeat_interval(Duration::from_secs(10))
                .with_post_call_delay(Duration::from_secs(5)),
            progress.clone(),
        );

        exec.execute::<RoleAssessmentOutput>(&agent, &prompts(), ctx())
            .await
            .unwrap();
        assert_eq!(progress.heartbeats.load(Ordering::SeqCst), 2);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(progress.heartbeats.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_heartbeat_stops_after_timeouts() {
        let provider = Arc::new(
            MockProvider::new(|_| assessment()).with_latency(Duration::from_secs(100)),
        );
        let agent = agent("a", provider.clone());
        let progress = Arc::new(CountingProgress::default());
        let exec = CallExecutor::new(
            quick_policy()
                .with_timeout(Duration::from_secs(25))
                .with_heartbeat_interval(Duration::from_secs(10))
                .with_max_retries(2),
            progress.clone(),
        );

        let err = exec
            .execute::<RoleAssessmentOutput>(&agent, &prompts(), ctx())
            .await
            .unwrap_err();
        match err {
            CallError::RetriesExhausted { attempts, last } => {
                assert_eq!(attempts, 2);
                assert!(matches!(*last, CallError::Timeout(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
        // Two beats per 25s attempt
        assert_eq!(progress.heartbeats.load(Ordering::SeqCst), 4);

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(progress.heartbeats.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_heartbeat_stops_after_retries_exhausted() {
        let provider = Arc::new(
            MockProvider::new(|_| ProviderOutcome::Retryable("503".into()))
                .with_latency(Duration::from_secs(15)),
        );
        let agent = agent("a", provider.clone());
        let progress = Arc::new(CountingProgress::default());
        let exec = CallExecutor::new(
            quick_policy()
                .with_heartbeat_interval(Duration::from_secs(10))
                .with_max_retries(2),
            progress.clone(),
        );

        let err = exec
            .execute::<RoleAssessmentOutput>(&agent, &prompts(), ctx())
            .await
            .unwrap_err();
        assert!(matches!(err, CallError::RetriesExhausted { attempts: 2, .. }));
        assert_eq!(provider.call_count(), 2);
        assert_eq!(progress.heartbeats.load(Ordering::SeqCst), 2);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(progress.heartbeats.load(Ordering::SeqCst), 2);
    }
}
