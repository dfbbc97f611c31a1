//! Execution parameters — call supervision and concurrency control.
//!
//! [`ExecutionParams`] groups the static parameters that control how
//! [`RunDebateUseCase`](crate::use_cases::run_debate::RunDebateUseCase)
//! drives provider calls. These are application-layer concerns, not
//! domain policy.

use debate_domain::AssignmentPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Supervision of a single structured call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallPolicy {
    /// Deadline for one attempt
    pub timeout: Duration,
    /// Interval between heartbeat notifications while an attempt is in flight
    pub heartbeat_interval: Duration,
    /// Cool-down applied once after the call's terminal outcome
    pub post_call_delay: Duration,
    /// Total attempts, including the first
    pub max_retries: u32,
}

impl Default for CallPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(2000),
            heartbeat_interval: Duration::from_secs(10),
            post_call_delay: Duration::from_secs(5),
            max_retries: 3,
        }
    }
}

impl CallPolicy {
    /// Backoff after the failed attempt with zero-based index `attempt`
    pub fn backoff(&self, attempt: u32) -> Duration {
        Duration::from_secs(1u64 << attempt.min(16))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    pub fn with_post_call_delay(mut self, delay: Duration) -> Self {
        self.post_call_delay = delay;
        self
    }

    pub fn with_max_retries(mut self, max: u32) -> Self {
        self.max_retries = max;
        self
    }
}

/// Semaphore sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConcurrencyLimits {
    /// Units in flight within one stage of one session
    pub stage_units: usize,
    /// Sessions in flight within one run
    pub sessions: usize,
}

impl Default for ConcurrencyLimits {
    fn default() -> Self {
        Self {
            stage_units: 4,
            sessions: 2,
        }
    }
}

/// Everything a run needs besides its collaborators
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionParams {
    pub call: CallPolicy,
    pub limits: ConcurrencyLimits,
    pub assignment: AssignmentPolicy,
    /// Fail a unit when persisting its record fails
    pub strict_persistence: bool,
}

impl ExecutionParams {
    // ==================== Builder Methods ====================

    pub fn with_call_policy(mut self, call: CallPolicy) -> Self {
        self.call = call;
        self
    }

    pub fn with_stage_limit(mut self, limit: usize) -> Self {
        self.limits.stage_units = limit.max(1);
        self
    }

    pub fn with_session_limit(mut self, limit: usize) -> Self {
        self.limits.sessions = limit.max(1);
        self
    }

    pub fn with_assignment_policy(mut self, policy: AssignmentPolicy) -> Self {
        self.assignment = policy;
        self
    }

    pub fn with_strict_persistence(mut self, strict: bool) -> Self {
        self.strict_persistence = strict;
        self
    }
}
