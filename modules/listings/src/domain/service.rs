use std::collections::HashMap;
use std::sync::Arc;

use catalog_query::{
    ListingFilter, ListingKind, ListingSchema, Page, QueryLimits, RawParams, Record, Visibility, paginate,
    record_from_row,
};
use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use tracing::{debug, info, instrument};

use super::error::DomainError;
use super::media::MediaUploader;
use super::repo::ListingRepository;
use super::upsert::{UpsertPipeline, WriteMode};

// ============================================================================
// Service Configuration
// ============================================================================

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub limits: HashMap<ListingKind, QueryLimits>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            limits: ListingKind::ALL
                .iter()
                .map(|&k| (k, QueryLimits::for_schema(k.schema())))
                .collect(),
        }
    }
}

impl ServiceConfig {
    #[must_use]
    pub fn limits(&self, kind: ListingKind) -> QueryLimits {
        self.limits
            .get(&kind)
            .copied()
            .unwrap_or_else(|| QueryLimits::for_schema(kind.schema()))
    }
}

// ============================================================================
// Service Implementation
// ============================================================================

/// Listing reads and admin writes across all listing kinds.
///
/// Each kind is bound to one repository; which backend sits behind it is
/// invisible here apart from the composite storage form it asks for.
pub struct ListingService {
    repos: HashMap<ListingKind, Arc<dyn ListingRepository>>,
    uploader: Arc<dyn MediaUploader>,
    config: ServiceConfig,
}

impl ListingService {
    #[must_use]
    pub fn new(uploader: Arc<dyn MediaUploader>, config: ServiceConfig) -> Self {
        Self {
            repos: HashMap::new(),
            uploader,
            config,
        }
    }

    #[must_use]
    pub fn with_repository(mut self, kind: ListingKind, repo: Arc<dyn ListingRepository>) -> Self {
        self.repos.insert(kind, repo);
        self
    }

    fn repo(&self, kind: ListingKind) -> Result<&Arc<dyn ListingRepository>, DomainError> {
        self.repos
            .get(&kind)
            .ok_or_else(|| DomainError::Configuration(format!("no storage bound for listing '{kind}'")))
    }

    /// One page of `kind` for the given request parameters.
    ///
    /// `total` and `data` come from two reads without a shared snapshot, so
    /// a concurrent write may make them disagree by that write.
    ///
    /// # Errors
    /// `Configuration` when `kind` has no storage, `Storage` on backend failure.
    #[instrument(skip(self, raw), fields(kind = %kind))]
    pub async fn list(
        &self,
        kind: ListingKind,
        raw: &RawParams,
        visibility: Visibility,
    ) -> Result<Page<Record>, DomainError> {
        let repo = self.repo(kind)?;
        let filter = ListingFilter::build(kind, raw, visibility, &self.config.limits(kind));
        let page = repo.fetch_page(&filter).await?;
        debug!(total = page.total, rows = page.rows.len(), "listing page fetched");
        Ok(paginate(page, &filter))
    }

    /// # Errors
    /// `NotFound` when no record has `id`.
    #[instrument(skip(self), fields(kind = %kind))]
    pub async fn get(&self, kind: ListingKind, id: &str) -> Result<Record, DomainError> {
        let repo = self.repo(kind)?;
        let schema = kind.schema();
        repo.find(schema, id)
            .await?
            .map(|row| record_from_row(&row, schema))
            .ok_or(DomainError::NotFound)
    }

    /// Validate, normalize and insert `payload`; returns the stored record.
    ///
    /// # Errors
    /// `Validation`, `OversizedField`, `UpstreamAsset` from the pipeline;
    /// `Conflict` on a duplicate unique value.
    #[instrument(skip(self, payload), fields(kind = %kind))]
    pub async fn create(&self, kind: ListingKind, payload: Value) -> Result<Record, DomainError> {
        let repo = self.repo(kind)?;
        let schema = kind.schema();
        let row = self
            .pipeline(schema, repo.as_ref())
            .prepare(payload, WriteMode::Create, &now())
            .await?;
        let id = row
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| DomainError::Storage(anyhow::anyhow!("prepared row has no id")))?;

        repo.insert(schema, row).await?;
        info!(%id, "listing created");
        self.get(kind, &id).await
    }

    /// Write the whitelisted fields present in `payload` to record `id`.
    ///
    /// # Errors
    /// `NotFound` when no record has `id`, otherwise as for [`create`](Self::create).
    #[instrument(skip(self, payload), fields(kind = %kind))]
    pub async fn update(&self, kind: ListingKind, id: &str, payload: Value) -> Result<Record, DomainError> {
        let repo = self.repo(kind)?;
        let schema = kind.schema();
        // Checked first so a missing record never triggers an asset upload.
        if repo.find(schema, id).await?.is_none() {
            return Err(DomainError::NotFound);
        }
        let row = self
            .pipeline(schema, repo.as_ref())
            .prepare(payload, WriteMode::Update, &now())
            .await?;

        let matched = repo.update(schema, id, row).await?;
        if matched == 0 {
            return Err(DomainError::NotFound);
        }
        info!(%id, "listing updated");
        self.get(kind, id).await
    }

    fn pipeline(&self, schema: &'static ListingSchema, repo: &dyn ListingRepository) -> UpsertPipeline<'_> {
        UpsertPipeline {
            schema,
            form: repo.storage_form(),
            uploader: self.uploader.as_ref(),
        }
    }
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
