use std::sync::Arc;

use async_trait::async_trait;
use catalog_db::document::{ensure_indexes, fetch_page, find_document, insert_document, update_document};
use catalog_db::{BackendRegistry, DocumentQuery, DocumentStore};
use catalog_query::{ListingFilter, ListingSchema, RawPage, StorageForm};
use dashmap::DashSet;

use crate::domain::error::DomainError;
use crate::domain::repo::{ListingRepository, Row};

/// Listings stored in a named document backend.
///
/// Unique indexes for a collection are registered the first time the
/// collection is touched.
pub struct DocumentListingRepository {
    registry: Arc<BackendRegistry>,
    backend: String,
    indexed: DashSet<&'static str>,
}

impl DocumentListingRepository {
    #[must_use]
    pub fn new(registry: Arc<BackendRegistry>, backend: impl Into<String>) -> Self {
        Self {
            registry,
            backend: backend.into(),
            indexed: DashSet::new(),
        }
    }

    async fn store(&self, schema: &'static ListingSchema) -> Result<Arc<dyn DocumentStore>, DomainError> {
        let store = self.registry.document(&self.backend).await?;
        if !self.indexed.contains(schema.collection) {
            ensure_indexes(store.as_ref(), schema).await?;
            self.indexed.insert(schema.collection);
        }
        Ok(store)
    }
}

#[async_trait]
impl ListingRepository for DocumentListingRepository {
    fn storage_form(&self) -> StorageForm {
        StorageForm::Native
    }

    async fn fetch_page(&self, filter: &ListingFilter) -> Result<RawPage, DomainError> {
        let store = self.store(filter.schema()).await?;
        let query = DocumentQuery::compile(filter);
        Ok(fetch_page(store.as_ref(), &query).await?)
    }

    async fn find(&self, schema: &'static ListingSchema, id: &str) -> Result<Option<Row>, DomainError> {
        let store = self.store(schema).await?;
        Ok(find_document(store.as_ref(), schema, id).await?)
    }

    async fn insert(&self, schema: &'static ListingSchema, row: Row) -> Result<(), DomainError> {
        let store = self.store(schema).await?;
        Ok(insert_document(store.as_ref(), schema, row).await?)
    }

    async fn update(&self, schema: &'static ListingSchema, id: &str, row: Row) -> Result<u64, DomainError> {
        let store = self.store(schema).await?;
        Ok(update_document(store.as_ref(), schema, id, row).await?)
    }
}
