//! Progress notification port
//!
//! Defines the interface for reporting progress during a debate run.

use debate_domain::{AgentId, SessionReport, Stage};
use std::time::Duration;

/// Callback for progress updates during a debate run
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (progress bars, plain lines, etc.).
/// Sessions run concurrently, so every callback names its problem.
pub trait DebateProgressNotifier: Send + Sync {
    /// Called when a session starts working on a problem
    fn on_session_start(&self, _problem_id: &str) {}

    /// Called when a stage starts
    fn on_stage_start(&self, problem_id: &str, stage: Stage, total_units: usize);

    /// Called when a unit completes within a stage
    fn on_unit_complete(&self, problem_id: &str, stage: Stage, agent: &AgentId, success: bool);

    /// Called when a stage completes
    fn on_stage_complete(&self, problem_id: &str, stage: Stage);

    /// Called periodically while a provider call is in flight
    fn on_heartbeat(&self, _problem_id: &str, _stage: Stage, _agent: &AgentId, _elapsed: Duration) {
    }

    /// Called once per session with its final report
    fn on_session_finished(&self, report: &SessionReport);
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl DebateProgressNotifier for NoProgress {
    fn on_stage_start(&self, _problem_id: &str, _stage: Stage, _total_units: usize) {}
    fn on_unit_complete(&self, _problem_id: &str, _stage: Stage, _agent: &AgentId, _success: bool) {
    }
    fn on_stage_complete(&self, _problem_id: &str, _stage: Stage) {}
    fn on_session_finished(&self, _report: &SessionReport) {}
}
