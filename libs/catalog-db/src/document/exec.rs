//! Execution of compiled listing queries against a [`DocumentStore`].

use catalog_query::{ListingSchema, RawPage, SEARCH_COLUMN, TIEBREAKER, search_text, touches_search};
use serde_json::{Value, json};

use super::query::DocumentQuery;
use super::store::{Document, DocumentStore, FindOptions};
use crate::error::StoreError;

/// Run the page query and the count under the same filter.
///
/// # Errors
/// Store failures, classified.
pub async fn fetch_page(store: &dyn DocumentStore, query: &DocumentQuery) -> Result<RawPage, StoreError> {
    let options = FindOptions {
        sort: query.sort.clone(),
        skip: query.skip,
        limit: Some(query.limit),
    };
    tracing::debug!(collection = query.collection(), filter = %query.filter, "compiled listing query");
    let rows = store
        .find(query.collection(), &query.filter, &options)
        .await
        .map_err(StoreError::from_document)?;
    let total = store
        .count(query.collection(), &query.filter)
        .await
        .map_err(StoreError::from_document)?;
    tracing::debug!(
        collection = query.collection(),
        rows = rows.len(),
        total,
        "document listing page fetched"
    );
    Ok(RawPage { rows, total })
}

fn by_id(id: &str) -> Value {
    json!({ TIEBREAKER: id })
}

/// # Errors
/// Store failures.
pub async fn find_document(
    store: &dyn DocumentStore,
    schema: &ListingSchema,
    id: &str,
) -> Result<Option<Document>, StoreError> {
    store
        .find_one(schema.collection, &by_id(id))
        .await
        .map_err(StoreError::from_document)
}

/// Insert one document along with its derived search field.
///
/// # Errors
/// `StoreError::UniqueViolation` or `StoreError::ValueTooLarge` when the
/// store rejects the document.
pub async fn insert_document(
    store: &dyn DocumentStore,
    schema: &ListingSchema,
    mut document: Document,
) -> Result<(), StoreError> {
    let text = search_text(schema, &document);
    document.insert(SEARCH_COLUMN.to_owned(), Value::String(text));
    store
        .insert_one(schema.collection, document)
        .await
        .map_err(StoreError::from_document)
}

/// Returns the number of documents matched. The search field is
/// recomputed from the merged document when any search column changes.
///
/// # Errors
/// Same classification as [`insert_document`].
pub async fn update_document(
    store: &dyn DocumentStore,
    schema: &ListingSchema,
    id: &str,
    mut set: Document,
) -> Result<u64, StoreError> {
    if touches_search(schema, &set) {
        let Some(mut merged) = find_document(store, schema, id).await? else {
            return Ok(0);
        };
        merged.extend(set.iter().map(|(k, v)| (k.clone(), v.clone())));
        set.insert(SEARCH_COLUMN.to_owned(), Value::String(search_text(schema, &merged)));
    }
    store
        .update_one(schema.collection, &by_id(id), set)
        .await
        .map_err(StoreError::from_document)
}

/// Register every unique index the schema declares.
///
/// # Errors
/// Store failures.
pub async fn ensure_indexes(store: &dyn DocumentStore, schema: &ListingSchema) -> Result<(), StoreError> {
    for field in schema.unique {
        store
            .ensure_unique_index(schema.collection, field)
            .await
            .map_err(StoreError::from_document)?;
    }
    Ok(())
}
