//! Application-level configuration.
//!
//! - [`ExecutionParams`] — call supervision, concurrency limits, role assignment
//!   policy and persistence strictness

pub mod execution_params;

pub use execution_params::{CallPolicy, ConcurrencyLimits, ExecutionParams};
