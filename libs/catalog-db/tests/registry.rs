#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::sync::Arc;

use catalog_db::document::InMemoryDocumentStore;
use catalog_db::relational;
use catalog_db::{BackendRegistry, DbError, DocumentConfig, DocumentEngine, DocumentStore};
use catalog_query::{ListingKind, StorageForm};
use common::{CourseSeed, course_row, memory_config};
use figment::Figment;
use figment::providers::{Format, Yaml};

#[tokio::test]
async fn relational_backend_is_opened_once_and_shared() {
    let registry = Arc::new(BackendRegistry::new(memory_config()));

    let handles = futures::future::join_all((0..8).map(|_| {
        let registry = Arc::clone(&registry);
        async move { registry.relational("main").await.unwrap() }
    }))
    .await;

    let schema = ListingKind::Courses.schema();
    relational::insert_row(
        handles[0].sea(),
        schema,
        &course_row(&CourseSeed::new("x", "Shared"), StorageForm::Serialized),
    )
    .await
    .unwrap();

    for handle in &handles {
        let row = relational::find_row(handle.sea(), schema, "x").await.unwrap();
        assert!(row.is_some(), "every caller must see the same in-memory database");
    }
}

#[tokio::test]
async fn document_backend_is_a_singleton() {
    let registry = BackendRegistry::new(memory_config());
    let a = registry.document("content").await.unwrap();
    let b = registry.document("content").await.unwrap();
    assert!(Arc::ptr_eq(&a, &b));
}

#[tokio::test]
async fn unknown_backends_are_configuration_errors() {
    let registry = BackendRegistry::new(memory_config());
    let err = registry.relational("analytics").await.unwrap_err();
    assert!(matches!(err, DbError::NotConfigured(_)));
    assert!(err.is_configuration());
    assert!(registry.document("nope").await.err().unwrap().is_configuration());
}

#[tokio::test]
async fn external_engine_requires_registration() {
    let mut config = memory_config();
    config.document.insert(
        "remote".to_owned(),
        DocumentConfig {
            engine: DocumentEngine::External,
            max_document_bytes: None,
        },
    );

    let registry = BackendRegistry::new(config.clone());
    assert!(registry.document("remote").await.err().unwrap().is_configuration());

    let registry = BackendRegistry::new(config);
    let store: Arc<dyn DocumentStore> = Arc::new(InMemoryDocumentStore::new());
    registry.register_document_store("remote", Arc::clone(&store));
    let resolved = registry.document("remote").await.unwrap();
    assert!(Arc::ptr_eq(&resolved, &store));
}

#[tokio::test]
async fn dsn_env_expansion_failure_is_reported() {
    let yaml = r#"
database:
  relational:
    main:
      dsn: "sqlite://${CATALOG_TEST_UNSET_DB_PATH}"
"#;
    let figment = Figment::new().merge(Yaml::string(yaml));
    let registry = BackendRegistry::from_figment(&figment).unwrap();
    let err = registry.relational("main").await.unwrap_err();
    assert!(matches!(err, DbError::EnvVar(_)));
}

#[test]
fn missing_database_section_means_no_backends() {
    let registry = BackendRegistry::from_figment(&Figment::new()).unwrap();
    assert!(registry.config().relational.is_empty());
    assert!(registry.config().document.is_empty());
}
