use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use catalog_query::{ListingFilter, ListingKind, ListingSchema, RawPage, RawParams, StorageForm, Visibility};
use serde_json::{Value, json};

use super::error::DomainError;
use super::media::{InlineAsset, MediaUploader, UploadError};
use super::repo::{ListingRepository, Row};
use super::service::{ListingService, ServiceConfig};

// Mock repository keeping rows by id, with a slug uniqueness check.
#[derive(Default)]
struct MockRepository {
    rows: Mutex<BTreeMap<String, Row>>,
    form: Option<StorageForm>,
}

impl MockRepository {
    fn native() -> Self {
        Self {
            form: Some(StorageForm::Native),
            ..Self::default()
        }
    }

    fn slug_taken(&self, row: &Row, except: Option<&str>) -> bool {
        let Some(slug) = row.get("slug") else {
            return false;
        };
        self.rows
            .lock()
            .unwrap()
            .iter()
            .any(|(id, r)| Some(id.as_str()) != except && r.get("slug") == Some(slug))
    }
}

#[async_trait]
impl ListingRepository for MockRepository {
    fn storage_form(&self) -> StorageForm {
        self.form.unwrap_or(StorageForm::Serialized)
    }

    async fn fetch_page(&self, filter: &ListingFilter) -> Result<RawPage, DomainError> {
        let rows: Vec<Row> = self.rows.lock().unwrap().values().cloned().collect();
        let total = u64::try_from(rows.len()).unwrap();
        let skip = usize::try_from(filter.view().offset()).unwrap();
        let take = usize::try_from(filter.limit()).unwrap();
        Ok(RawPage {
            rows: rows.into_iter().skip(skip).take(take).collect(),
            total,
        })
    }

    async fn find(&self, _schema: &'static ListingSchema, id: &str) -> Result<Option<Row>, DomainError> {
        Ok(self.rows.lock().unwrap().get(id).cloned())
    }

    async fn insert(&self, _schema: &'static ListingSchema, row: Row) -> Result<(), DomainError> {
        if self.slug_taken(&row, None) {
            return Err(DomainError::Conflict {
                field: "slug".to_owned(),
            });
        }
        let id = row["id"].as_str().unwrap().to_owned();
        self.rows.lock().unwrap().insert(id, row);
        Ok(())
    }

    async fn update(&self, _schema: &'static ListingSchema, id: &str, row: Row) -> Result<u64, DomainError> {
        if self.slug_taken(&row, Some(id)) {
            return Err(DomainError::Conflict {
                field: "slug".to_owned(),
            });
        }
        let mut rows = self.rows.lock().unwrap();
        let Some(existing) = rows.get_mut(id) else {
            return Ok(0);
        };
        existing.extend(row);
        Ok(1)
    }
}

#[derive(Default)]
struct CountingUploader {
    uploads: Mutex<u32>,
}

#[async_trait]
impl MediaUploader for CountingUploader {
    async fn upload(&self, folder: &str, asset: InlineAsset) -> Result<String, UploadError> {
        *self.uploads.lock().unwrap() += 1;
        Ok(format!("/media/{folder}/new.{}", asset.extension()))
    }
}

fn service_with(kind: ListingKind, repo: Arc<MockRepository>, uploader: Arc<CountingUploader>) -> ListingService {
    ListingService::new(uploader, ServiceConfig::default()).with_repository(kind, repo)
}

fn course(title: &str) -> Value {
    json!({"title": title, "platform": "Coursera", "tags": ["rust"], "instructor": {"name": "Ada"}})
}

#[tokio::test]
async fn create_then_get_returns_domain_form() {
    let repo = Arc::new(MockRepository::default());
    let svc = service_with(ListingKind::Courses, repo.clone(), Arc::default());

    let created = svc.create(ListingKind::Courses, course("Rust Basics")).await.unwrap();
    assert_eq!(created["slug"], "rust-basics");
    assert_eq!(created["tags"], json!(["rust"]));
    assert_eq!(created["instructor"], json!({"name": "Ada"}));
    assert_eq!(created["isFree"], json!(false));

    // stored serialized, returned structured
    let id = created["id"].as_str().unwrap();
    let stored = repo.rows.lock().unwrap()[id].clone();
    assert_eq!(stored["tags"], json!(r#"["rust"]"#));

    let fetched = svc.get(ListingKind::Courses, id).await.unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn duplicate_slug_is_a_conflict() {
    let svc = service_with(ListingKind::Courses, Arc::default(), Arc::default());
    svc.create(ListingKind::Courses, course("Same")).await.unwrap();
    let err = svc.create(ListingKind::Courses, course("Same")).await.unwrap_err();
    assert!(matches!(err, DomainError::Conflict { ref field } if field == "slug"));
}

#[tokio::test]
async fn update_missing_record_is_not_found_and_skips_upload() {
    let uploader = Arc::new(CountingUploader::default());
    let svc = service_with(ListingKind::Courses, Arc::default(), uploader.clone());
    let err = svc
        .update(
            ListingKind::Courses,
            "nope",
            json!({"image": "data:image/png;base64,aGVsbG8="}),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound));
    assert_eq!(*uploader.uploads.lock().unwrap(), 0);
}

#[tokio::test]
async fn update_merges_only_present_fields() {
    let repo = Arc::new(MockRepository::native());
    let uploader = Arc::new(CountingUploader::default());
    let svc = service_with(ListingKind::Resources, repo, uploader.clone());
    let created = svc
        .create(ListingKind::Resources, json!({"title": "Guide", "type": "PDF", "downloads": 3}))
        .await
        .unwrap();
    let id = created["id"].as_str().unwrap();

    let updated = svc
        .update(
            ListingKind::Resources,
            id,
            json!({"downloads": "10", "image": "data:image/jpeg;base64,AA==", "createdAt": "forged"}),
        )
        .await
        .unwrap();
    assert_eq!(updated["downloads"], json!(10));
    assert_eq!(updated["title"], "Guide");
    assert_eq!(updated["image"], "/media/resources/new.jpg");
    assert_eq!(updated["createdAt"], created["createdAt"]);
    assert_eq!(*uploader.uploads.lock().unwrap(), 1);
}

#[tokio::test]
async fn list_pages_through_repository() {
    let svc = service_with(ListingKind::Courses, Arc::default(), Arc::default());
    for i in 0..5 {
        svc.create(ListingKind::Courses, course(&format!("Course {i}"))).await.unwrap();
    }
    let raw = RawParams::new().with("page", "2").with("limit", "2");
    let page = svc.list(ListingKind::Courses, &raw, Visibility::Public).await.unwrap();
    assert_eq!(page.data.len(), 2);
    assert_eq!(page.pagination.total, 5);
    assert_eq!(page.pagination.total_pages, 3);
    assert_eq!(page.pagination.page, 2);
}

#[tokio::test]
async fn unbound_kind_is_a_configuration_error() {
    let svc = service_with(ListingKind::Courses, Arc::default(), Arc::default());
    let err = svc
        .list(ListingKind::Jobs, &RawParams::new(), Visibility::Any)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Configuration(_)));
}

#[tokio::test]
async fn get_unknown_id_is_not_found() {
    let svc = service_with(ListingKind::Courses, Arc::default(), Arc::default());
    assert!(matches!(
        svc.get(ListingKind::Courses, "missing").await,
        Err(DomainError::NotFound)
    ));
}
