//! Wiring of the listings module: configuration + backend registry in,
//! service and router out.

use std::sync::Arc;

use axum::Router;
use catalog_db::BackendRegistry;
use catalog_query::{ListingKind, QueryLimits};
use tracing::{debug, info};

use crate::config::{BackendKind, ListingsConfig};
use crate::domain::media::MediaUploader;
use crate::domain::repo::ListingRepository;
use crate::domain::service::{ListingService, ServiceConfig};
use crate::infra::media::{DisabledMediaUploader, FsMediaUploader};
use crate::infra::storage::{DocumentListingRepository, RelationalListingRepository};

pub struct ListingsModule {
    service: Arc<ListingService>,
}

impl ListingsModule {
    /// Bind every listing kind to its configured backend.
    ///
    /// Backends are not opened here; a missing or broken backend surfaces
    /// on the first request that needs it.
    #[must_use]
    pub fn init(cfg: &ListingsConfig, registry: &Arc<BackendRegistry>) -> Self {
        info!("Initializing listings module");

        let uploader: Arc<dyn MediaUploader> = match &cfg.media {
            Some(media) => {
                debug!(dir = %media.dir.display(), base_url = %media.base_url, "media uploads enabled");
                Arc::new(FsMediaUploader::new(media.dir.clone(), media.base_url.clone()))
            }
            None => Arc::new(DisabledMediaUploader),
        };

        let limits = ListingKind::ALL.iter().map(|&kind| (kind, query_limits(cfg, kind))).collect();
        let mut service = ListingService::new(uploader, ServiceConfig { limits });

        for &kind in ListingKind::ALL {
            let binding = cfg.binding(kind);
            let repo: Arc<dyn ListingRepository> = match binding.backend {
                BackendKind::Relational => Arc::new(RelationalListingRepository::new(
                    Arc::clone(registry),
                    binding.store.clone(),
                )),
                BackendKind::Document => {
                    Arc::new(DocumentListingRepository::new(Arc::clone(registry), binding.store.clone()))
                }
            };
            debug!(%kind, backend = ?binding.backend, store = %binding.store, "listing bound");
            service = service.with_repository(kind, repo);
        }

        info!("Listings module initialized");
        Self {
            service: Arc::new(service),
        }
    }

    #[must_use]
    pub fn service(&self) -> Arc<ListingService> {
        Arc::clone(&self.service)
    }

    #[must_use]
    pub fn router(&self) -> Router {
        crate::api::rest::router(self.service())
    }
}

fn query_limits(cfg: &ListingsConfig, kind: ListingKind) -> QueryLimits {
    let binding = cfg.binding(kind);
    let mut limits = QueryLimits::for_schema(kind.schema()).with_max_search_len(cfg.max_search_len);
    if let Some(max) = binding.max_limit {
        limits = limits.with_max_limit(max);
    }
    if let Some(default) = binding.default_limit {
        limits = limits.with_default_limit(default);
    }
    limits
}
