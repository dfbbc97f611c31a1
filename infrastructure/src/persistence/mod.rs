//! File-backed persistence
//!
//! [`JsonlDocumentStore`] appends every record to a per-collection JSONL
//! file. [`FileArtifactWriter`] mirrors each record as a pretty-printed JSON
//! file grouped by stage.

mod artifact_writer;
mod jsonl_store;

pub use artifact_writer::FileArtifactWriter;
pub use jsonl_store::JsonlDocumentStore;

/// Keep a path component to characters that are safe on every filesystem
pub(crate) fn sanitize_component(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_matches('.');
    if trimmed.is_empty() {
        "_".to_string()
    } else {
        trimmed.to_string()
    }
}
