//! Per-record JSON artifacts

use super::sanitize_component;
use async_trait::async_trait;
use debate_application::{ArtifactSink, StoreError};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Writes `{root}/{directory}/{name}.json`, replacing any earlier file
pub struct FileArtifactWriter {
    root: PathBuf,
}

impl FileArtifactWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn artifact_path(&self, directory: &str, name: &str) -> PathBuf {
        self.root
            .join(sanitize_component(directory))
            .join(format!("{}.json", sanitize_component(name)))
    }
}

#[async_trait]
impl ArtifactSink for FileArtifactWriter {
    async fn write_artifact(
        &self,
        directory: &str,
        name: &str,
        document: &Value,
    ) -> Result<(), StoreError> {
        let path = self.artifact_path(directory, name);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::Io(format!("{}: {}", parent.display(), e)))?;
        }
        let body = serde_json::to_vec_pretty(document)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        tokio::fs::write(&path, body)
            .await
            .map_err(|e| StoreError::Io(format!("{}: {}", path.display(), e)))
    }
}
