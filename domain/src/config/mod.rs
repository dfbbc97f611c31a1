//! Configuration value objects for the domain layer
//!
//! Used by the configuration loader and the presentation layer alike.

mod output_format;
pub mod validation;

pub use output_format::OutputFormat;
pub use validation::{ConfigIssue, ConfigIssueCode, Severity, validate_roster};
