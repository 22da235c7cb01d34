//! Document backend: filter compilation, the store contract and the
//! in-memory engine.

pub mod exec;
pub mod memory;
pub mod query;
pub mod store;

pub use exec::{ensure_indexes, fetch_page, find_document, insert_document, update_document};
pub use memory::{DEFAULT_MAX_DOCUMENT_BYTES, InMemoryDocumentStore};
pub use query::DocumentQuery;
pub use store::{Document, DocumentStore, DocumentStoreError, FindOptions};
