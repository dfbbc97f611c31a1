//! Prompt domain
//!
//! Prompt construction for each stage of the debate.

mod template;

pub use template::{DebatePrompts, PromptPair};
