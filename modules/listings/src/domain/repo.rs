use async_trait::async_trait;
use catalog_query::{ListingFilter, ListingSchema, RawPage, StorageForm};
use serde_json::{Map, Value};

use super::error::DomainError;

/// One storage row keyed by column name.
pub type Row = Map<String, Value>;

/// Storage adapter for one backend.
///
/// Both adapters speak rows keyed by column name; the only backend-visible
/// difference the service sees is [`storage_form`](Self::storage_form).
#[async_trait]
pub trait ListingRepository: Send + Sync {
    /// How composites must be encoded before [`insert`](Self::insert) or
    /// [`update`](Self::update).
    fn storage_form(&self) -> StorageForm;

    async fn fetch_page(&self, filter: &ListingFilter) -> Result<RawPage, DomainError>;

    async fn find(&self, schema: &'static ListingSchema, id: &str) -> Result<Option<Row>, DomainError>;

    async fn insert(&self, schema: &'static ListingSchema, row: Row) -> Result<(), DomainError>;

    /// Returns the number of rows matched.
    async fn update(&self, schema: &'static ListingSchema, id: &str, row: Row) -> Result<u64, DomainError>;
}
