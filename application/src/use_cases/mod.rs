//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod call_executor;
pub mod debate_session;
pub mod recorder;
pub mod run_debate;
pub mod stage_coordinator;
