//! Persistence ports
//!
//! [`DocumentStore`] receives one document per completed unit, keyed by the
//! record id. [`ArtifactSink`] mirrors the same document to a named file
//! artifact. Both are observational: later stages read from in-memory
//! context, never from what was persisted.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Mutex;
use thiserror::Error;

/// Errors that can occur while persisting
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Write `document` into `collection`, under `document_id` when given
    async fn write(
        &self,
        collection: &str,
        document: &Value,
        document_id: Option<&str>,
    ) -> Result<(), StoreError>;
}

#[async_trait]
pub trait ArtifactSink: Send + Sync {
    /// Write `document` as `{directory}/{name}.json`
    async fn write_artifact(
        &self,
        directory: &str,
        name: &str,
        document: &Value,
    ) -> Result<(), StoreError>;
}

/// No-op store for when persistence is disabled
pub struct NoDocumentStore;

#[async_trait]
impl DocumentStore for NoDocumentStore {
    async fn write(&self, _: &str, _: &Value, _: Option<&str>) -> Result<(), StoreError> {
        Ok(())
    }
}

/// No-op artifact sink
pub struct NoArtifacts;

#[async_trait]
impl ArtifactSink for NoArtifacts {
    async fn write_artifact(&self, _: &str, _: &str, _: &Value) -> Result<(), StoreError> {
        Ok(())
    }
}

/// A document captured by [`MemoryDocumentStore`]
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub collection: String,
    pub id: Option<String>,
    pub document: Value,
}

/// In-memory store, mainly for tests and dry runs
#[derive(Default)]
pub struct MemoryDocumentStore {
    documents: Mutex<Vec<StoredDocument>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn documents(&self) -> Vec<StoredDocument> {
        self.documents
            .lock()
            .map(|docs| docs.clone())
            .unwrap_or_default()
    }

    pub fn count(&self, collection: &str) -> usize {
        self.documents()
            .iter()
            .filter(|d| d.collection == collection)
            .count()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn write(
        &self,
        collection: &str,
        document: &Value,
        document_id: Option<&str>,
    ) -> Result<(), StoreError> {
        let mut docs = self
            .documents
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        docs.push(StoredDocument {
            collection: collection.to_string(),
            id: document_id.map(str::to_string),
            document: document.clone(),
        });
        Ok(())
    }
}
