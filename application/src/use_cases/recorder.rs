//! Record persistence for debate sessions
//!
//! Every completed unit produces one document in its stage's collection
//! and one mirrored file artifact. By default a failed write is logged and
//! the unit still counts as successful; in strict mode the write failure
//! fails the unit.

use super::stage_coordinator::UnitError;
use crate::ports::document_store::{ArtifactSink, DocumentStore, StoreError};
use chrono::Utc;
use debate_domain::Stage;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::warn;

/// Collection receiving one document per session start
pub const RUNS_COLLECTION: &str = "Runs";

/// Fresh hex identifier for a record
pub fn new_record_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Artifact file stem: parts joined by `_`, followed by the problem id
pub fn artifact_name(parts: &[&str], problem_id: &str) -> String {
    let mut name = parts.join("_");
    name.push('_');
    name.push_str(problem_id);
    name
}

pub struct Recorder {
    store: Arc<dyn DocumentStore>,
    artifacts: Arc<dyn ArtifactSink>,
    strict: bool,
}

impl Recorder {
    pub fn new(store: Arc<dyn DocumentStore>, artifacts: Arc<dyn ArtifactSink>, strict: bool) -> Self {
        Self {
            store,
            artifacts,
            strict,
        }
    }

    /// Persist one stage record and its artifact
    pub async fn record<R: Serialize + Sync>(
        &self,
        stage: Stage,
        id: &str,
        artifact: &str,
        record: &R,
    ) -> Result<(), UnitError> {
        match self.write(stage, id, artifact, record).await {
            Ok(()) => Ok(()),
            Err(e) if self.strict => Err(UnitError::Persistence(e)),
            Err(e) => {
                warn!(stage = %stage, record = id, "Persistence failed, continuing: {}", e);
                Ok(())
            }
        }
    }

    async fn write<R: Serialize + Sync>(
        &self,
        stage: Stage,
        id: &str,
        artifact: &str,
        record: &R,
    ) -> Result<(), StoreError> {
        let document =
            serde_json::to_value(record).map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.store
            .write(stage.collection(), &document, Some(id))
            .await?;
        self.artifacts
            .write_artifact(stage.artifact_dir(), artifact, &document)
            .await
    }

    /// Record that a session started; failures are only logged
    pub async fn record_run(&self, run_id: &str, problem_id: &str) {
        let document = json!({
            "run_id": run_id,
            "problem_id": problem_id,
            "started_at": Utc::now().to_rfc3339(),
        });
        if let Err(e) = self.store.write(RUNS_COLLECTION, &document, None).await {
            warn!(problem = problem_id, "Failed to record run start: {}", e);
        }
    }
}
