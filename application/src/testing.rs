//! Test doubles shared by the use case tests

use crate::agent::{Agent, AgentRoster};
use crate::ports::provider::{ProviderClient, ProviderOutcome, ProviderRequest};
use async_trait::async_trait;
use debate_domain::{AgentConfig, ProviderKind};
use serde_json::json;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

type Responder = Box<dyn Fn(&ProviderRequest) -> ProviderOutcome + Send + Sync>;

/// Provider whose replies come from a closure, with optional latency
pub(crate) struct MockProvider {
    respond: Responder,
    latency: Duration,
    calls: Mutex<Vec<(Instant, ProviderRequest)>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl MockProvider {
    pub fn new(respond: impl Fn(&ProviderRequest) -> ProviderOutcome + Send + Sync + 'static) -> Self {
        Self {
            respond: Box::new(respond),
            latency: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    /// Replies with `outcomes` in order, then keeps failing transiently
    pub fn scripted(outcomes: Vec<ProviderOutcome>) -> Self {
        let queue = Mutex::new(VecDeque::from(outcomes));
        Self::new(move |_| {
            queue
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| ProviderOutcome::Retryable("script exhausted".into()))
        })
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(t, _)| *t).collect()
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.calls.lock().unwrap().iter().map(|(_, r)| r.clone()).collect()
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProviderClient for MockProvider {
    async fn submit(&self, request: &ProviderRequest) -> ProviderOutcome {
        self.calls
            .lock()
            .unwrap()
            .push((Instant::now(), request.clone()));
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        (self.respond)(request)
    }
}

/// A well-formed reply for every stage, with fixed role scores
pub(crate) fn stage_reply(request: &ProviderRequest, judge: f64, solver: f64) -> ProviderOutcome {
    let value = match request.schema_name {
        "role_assessment" => json!({
            "judge_score": judge,
            "solver_score": solver,
            "reasoning": "scored from the problem category"
        }),
        "problem_solution" => json!({
            "answer": "42",
            "reasoning": ["restate", "compute"],
            "confidence": 0.7
        }),
        "problem_solution_review" => json!({
            "evaluation": {
                "strengths": ["clear"],
                "weaknesses": [],
                "errors": [],
                "suggested_changes": []
            },
            "overall_assessment": "correct",
            "confidence": 0.8
        }),
        "refined_problem_solution" => json!({
            "changes_made": [],
            "refined_reasoning": ["unchanged"],
            "refined_answer": "42",
            "answer_changed": false,
            "confidence": 0.9
        }),
        "final_judgement" => json!({
            "reasoning": ["all agree"],
            "winner_solver": "Solver 2",
            "confidence": 0.9
        }),
        other => return ProviderOutcome::Fatal(format!("unexpected schema {}", other)),
    };
    ProviderOutcome::Ok(value)
}

pub(crate) fn agent(id: &str, client: Arc<dyn ProviderClient>) -> Arc<Agent> {
    Arc::new(Agent::new(
        AgentConfig::new(id, ProviderKind::OpenAi, "mock-model"),
        client,
    ))
}

/// Four agents with the reference scores A(0.9,0.1) B(0.2,0.8) C(0.3,0.7) D(0.4,0.6)
pub(crate) fn reference_roster(latency: Duration) -> (AgentRoster, Vec<Arc<MockProvider>>) {
    let scores = [("A", 0.9, 0.1), ("B", 0.2, 0.8), ("C", 0.3, 0.7), ("D", 0.4, 0.6)];
    let mut providers = Vec::new();
    let mut agents = Vec::new();
    for (id, judge, solver) in scores {
        let provider = Arc::new(
            MockProvider::new(move |r| stage_reply(r, judge, solver)).with_latency(latency),
        );
        agents.push(agent(id, provider.clone()));
        providers.push(provider);
    }
    (AgentRoster::new(agents), providers)
}
