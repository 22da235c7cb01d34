use std::sync::Arc;

use async_trait::async_trait;
use catalog_db::relational::{fetch_page, find_row, insert_row, update_row};
use catalog_db::{BackendRegistry, DbHandle, RelationalQuery};
use catalog_query::{ListingFilter, ListingSchema, RawPage, StorageForm};

use crate::domain::error::DomainError;
use crate::domain::repo::{ListingRepository, Row};

/// Listings stored in a named relational backend.
///
/// The connection is resolved through the registry on every call, so the
/// first request opens it and later ones reuse it.
pub struct RelationalListingRepository {
    registry: Arc<BackendRegistry>,
    backend: String,
}

impl RelationalListingRepository {
    #[must_use]
    pub fn new(registry: Arc<BackendRegistry>, backend: impl Into<String>) -> Self {
        Self {
            registry,
            backend: backend.into(),
        }
    }

    async fn handle(&self) -> Result<DbHandle, DomainError> {
        Ok(self.registry.relational(&self.backend).await?)
    }
}

#[async_trait]
impl ListingRepository for RelationalListingRepository {
    fn storage_form(&self) -> StorageForm {
        StorageForm::Serialized
    }

    async fn fetch_page(&self, filter: &ListingFilter) -> Result<RawPage, DomainError> {
        let handle = self.handle().await?;
        let query = RelationalQuery::compile(filter);
        Ok(fetch_page(handle.sea(), &query).await?)
    }

    async fn find(&self, schema: &'static ListingSchema, id: &str) -> Result<Option<Row>, DomainError> {
        let handle = self.handle().await?;
        Ok(find_row(handle.sea(), schema, id).await?)
    }

    async fn insert(&self, schema: &'static ListingSchema, row: Row) -> Result<(), DomainError> {
        let handle = self.handle().await?;
        Ok(insert_row(handle.sea(), schema, &row).await?)
    }

    async fn update(&self, schema: &'static ListingSchema, id: &str, row: Row) -> Result<u64, DomainError> {
        let handle = self.handle().await?;
        Ok(update_row(handle.sea(), schema, id, &row).await?)
    }
}
