//! JSONL document store
//!
//! One file per collection under the store directory, opened lazily on the
//! first write. Each document becomes one line carrying `_id` (when given)
//! and `written_at`.

use super::sanitize_component;
use async_trait::async_trait;
use debate_application::{DocumentStore, StoreError};
use serde_json::Value;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

pub struct JsonlDocumentStore {
    dir: PathBuf,
    writers: Mutex<HashMap<String, BufWriter<File>>>,
}

impl JsonlDocumentStore {
    /// Create a store rooted at `dir`, creating the directory if needed
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|e| {
            StoreError::Unavailable(format!("cannot create {}: {}", dir.display(), e))
        })?;
        Ok(Self {
            dir: dir.to_path_buf(),
            writers: Mutex::new(HashMap::new()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `collection`
    pub fn collection_path(&self, collection: &str) -> PathBuf {
        self.dir
            .join(format!("{}.jsonl", sanitize_component(collection)))
    }

    fn open(&self, collection: &str) -> Result<BufWriter<File>, StoreError> {
        let path = self.collection_path(collection);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| StoreError::Io(format!("{}: {}", path.display(), e)))?;
        debug!(collection, path = %path.display(), "Opened collection file");
        Ok(BufWriter::new(file))
    }
}

#[async_trait]
impl DocumentStore for JsonlDocumentStore {
    async fn write(
        &self,
        collection: &str,
        document: &Value,
        document_id: Option<&str>,
    ) -> Result<(), StoreError> {
        let written_at = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        let record = match document {
            Value::Object(map) => {
                let mut map = map.clone();
                if let Some(id) = document_id {
                    map.insert("_id".to_string(), Value::String(id.to_string()));
                }
                map.insert("written_at".to_string(), Value::String(written_at));
                Value::Object(map)
            }
            other => serde_json::json!({
                "_id": document_id,
                "written_at": written_at,
                "data": other,
            }),
        };
        let line = serde_json::to_string(&record)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let mut writers = self
            .writers
            .lock()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".into()))?;
        if !writers.contains_key(collection) {
            let writer = self.open(collection)?;
            writers.insert(collection.to_string(), writer);
        }
        let writer = writers
            .get_mut(collection)
            .ok_or_else(|| StoreError::Unavailable(format!("no writer for {}", collection)))?;

        writeln!(writer, "{}", line).map_err(|e| StoreError::Io(e.to_string()))?;
        // Append-only: flush per record so a crash loses at most one line
        writer.flush().map_err(|e| StoreError::Io(e.to_string()))
    }
}

impl Drop for JsonlDocumentStore {
    fn drop(&mut self) {
        if let Ok(mut writers) = self.writers.lock() {
            for writer in writers.values_mut() {
                let _ = writer.flush();
            }
        }
    }
}
