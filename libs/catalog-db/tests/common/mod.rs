#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use catalog_db::document::{self, DocumentQuery, InMemoryDocumentStore};
use catalog_db::relational::{self, RelationalQuery};
use catalog_db::{BackendRegistry, DatabaseConfig, DbHandle, DocumentConfig, DocumentStore, RelationalConfig, StoreError};
use catalog_query::{
    Composite, ListingFilter, ListingKind, QueryLimits, RawPage, RawParams, StorageForm, Visibility, deflate,
};
use serde_json::{Map, Value, json};

pub struct CourseSeed<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub level: &'a str,
    pub platform: &'a str,
    pub tags: &'a [&'a str],
    pub visibility: &'a str,
    pub minute: u32,
}

impl<'a> CourseSeed<'a> {
    pub fn new(id: &'a str, title: &'a str) -> Self {
        Self {
            id,
            title,
            level: "Beginner",
            platform: "Coursera",
            tags: &[],
            visibility: "public",
            minute: 0,
        }
    }
}

pub fn course_row(seed: &CourseSeed<'_>, form: StorageForm) -> Map<String, Value> {
    let tags = Composite::Sequence(seed.tags.iter().map(|t| (*t).to_owned()).collect());
    let instructor = Composite::Object(json!({"name": "Staff"}).as_object().cloned().unwrap());
    let created = format!("2025-01-01T00:{:02}:00.000Z", seed.minute);
    let mut row = json!({
        "id": seed.id,
        "title": seed.title,
        "slug": format!("slug-{}", seed.id),
        "platform": seed.platform,
        "level": seed.level,
        "category": "Programming",
        "visibility": seed.visibility,
        "enrollments": 0,
        "created_at": created,
        "updated_at": created,
    })
    .as_object()
    .cloned()
    .unwrap();
    row.insert("tags".to_owned(), deflate(&tags, form));
    row.insert("instructor".to_owned(), deflate(&instructor, form));
    row
}

pub async fn sqlite() -> DbHandle {
    let mut config = DatabaseConfig::default();
    config
        .relational
        .insert("main".to_owned(), RelationalConfig::with_dsn("sqlite::memory:"));
    BackendRegistry::new(config).relational("main").await.unwrap()
}

pub async fn memory_store() -> Arc<dyn DocumentStore> {
    let store: Arc<dyn DocumentStore> = Arc::new(InMemoryDocumentStore::new());
    document::ensure_indexes(store.as_ref(), ListingKind::Courses.schema())
        .await
        .unwrap();
    store
}

/// The same listing served by both backends.
pub struct Pair {
    pub sql: DbHandle,
    pub docs: Arc<dyn DocumentStore>,
}

impl Pair {
    pub async fn new() -> Self {
        Self {
            sql: sqlite().await,
            docs: memory_store().await,
        }
    }

    pub async fn insert(&self, seed: &CourseSeed<'_>) -> (Result<(), StoreError>, Result<(), StoreError>) {
        let schema = ListingKind::Courses.schema();
        let sql = relational::insert_row(self.sql.sea(), schema, &course_row(seed, StorageForm::Serialized)).await;
        let doc = document::insert_document(self.docs.as_ref(), schema, course_row(seed, StorageForm::Native)).await;
        (sql, doc)
    }

    pub async fn seed(&self, seeds: &[CourseSeed<'_>]) {
        for seed in seeds {
            let (sql, doc) = self.insert(seed).await;
            sql.unwrap();
            doc.unwrap();
        }
    }

    pub async fn fetch(&self, raw: &RawParams, visibility: Visibility) -> (ListingFilter, RawPage, RawPage) {
        let limits = QueryLimits::for_schema(ListingKind::Courses.schema());
        let filter = ListingFilter::build(ListingKind::Courses, raw, visibility, &limits);
        let sql = relational::fetch_page(self.sql.sea(), &RelationalQuery::compile(&filter))
            .await
            .unwrap();
        let doc = document::fetch_page(self.docs.as_ref(), &DocumentQuery::compile(&filter))
            .await
            .unwrap();
        (filter, sql, doc)
    }
}

pub fn ids(page: &RawPage) -> Vec<String> {
    page.rows
        .iter()
        .map(|r| r["id"].as_str().unwrap_or_default().to_owned())
        .collect()
}

pub fn memory_config() -> DatabaseConfig {
    let mut config = DatabaseConfig::default();
    config
        .relational
        .insert("main".to_owned(), RelationalConfig::with_dsn("sqlite::memory:"));
    config.document.insert("content".to_owned(), DocumentConfig::default());
    config
}
