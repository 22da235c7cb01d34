use async_trait::async_trait;
use catalog_query::SortDir;
use serde_json::{Map, Value};
use thiserror::Error;

/// One stored document, keyed by column name.
pub type Document = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentStoreError {
    #[error("duplicate key for unique field '{field}'")]
    DuplicateKey { field: String },

    #[error("document of {size} bytes exceeds the {max} byte limit")]
    DocumentTooLarge { size: usize, max: usize },

    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    #[error("document backend failure: {0}")]
    Backend(String),
}

/// Find options mirroring the compiled listing query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindOptions {
    pub sort: Vec<(String, SortDir)>,
    pub skip: u64,
    pub limit: Option<u64>,
}

/// Minimal document-database contract the catalog relies on.
///
/// Filters use the operator-object dialect produced by
/// [`DocumentQuery`](super::DocumentQuery). A store must reject a write that
/// would duplicate a value under an index registered with
/// [`ensure_unique_index`](DocumentStore::ensure_unique_index).
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find(
        &self,
        collection: &str,
        filter: &Value,
        options: &FindOptions,
    ) -> Result<Vec<Document>, DocumentStoreError>;

    async fn count(&self, collection: &str, filter: &Value) -> Result<u64, DocumentStoreError>;

    async fn find_one(&self, collection: &str, filter: &Value) -> Result<Option<Document>, DocumentStoreError>;

    async fn insert_one(&self, collection: &str, document: Document) -> Result<(), DocumentStoreError>;

    /// Set the given keys on the first match. Returns the number matched.
    async fn update_one(&self, collection: &str, filter: &Value, set: Document) -> Result<u64, DocumentStoreError>;

    async fn ensure_unique_index(&self, collection: &str, field: &str) -> Result<(), DocumentStoreError>;
}
