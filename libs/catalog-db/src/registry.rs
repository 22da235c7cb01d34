//! Named, lazily opened storage backends.
//!
//! Listings refer to backends by name. The first request for a name opens
//! it (and migrates relational schemas when `auto_migrate` is set); every
//! later request, including concurrent ones racing the first, gets the same
//! handle.

use std::sync::Arc;

use dashmap::DashMap;
use figment::Figment;
use tokio::sync::OnceCell;

use crate::config::{DatabaseConfig, DocumentEngine, RelationalConfig, expand_env_vars, redact_credentials_in_dsn};
use crate::document::{DocumentStore, InMemoryDocumentStore};
use crate::error::{DbError, Result};
use crate::handle::DbHandle;
use crate::relational::Migrator;

pub struct BackendRegistry {
    config: DatabaseConfig,
    relational: DashMap<String, Arc<OnceCell<DbHandle>>>,
    document: DashMap<String, Arc<OnceCell<Arc<dyn DocumentStore>>>>,
    external: DashMap<String, Arc<dyn DocumentStore>>,
}

impl BackendRegistry {
    #[must_use]
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            config,
            relational: DashMap::new(),
            document: DashMap::new(),
            external: DashMap::new(),
        }
    }

    /// Read the `database` section; absent means no backends.
    ///
    /// # Errors
    /// `DbError::InvalidConfig` when the section does not deserialize.
    pub fn from_figment(figment: &Figment) -> Result<Self> {
        let config = if figment.contains("database") {
            figment
                .extract_inner::<DatabaseConfig>("database")
                .map_err(|e| DbError::InvalidConfig(e.to_string()))?
        } else {
            DatabaseConfig::default()
        };
        Ok(Self::new(config))
    }

    #[must_use]
    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Provide the store behind a document backend whose engine is `external`.
    pub fn register_document_store(&self, name: impl Into<String>, store: Arc<dyn DocumentStore>) {
        self.external.insert(name.into(), store);
    }

    /// Open (once) and return the relational backend `name`.
    ///
    /// # Errors
    /// `DbError::NotConfigured` for an unknown name or a missing DSN;
    /// connection and migration failures otherwise.
    pub async fn relational(&self, name: &str) -> Result<DbHandle> {
        let cfg = self
            .config
            .relational
            .get(name)
            .ok_or_else(|| DbError::NotConfigured(format!("relational backend '{name}'")))?;
        let cell = self
            .relational
            .entry(name.to_owned())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();
        let handle = cell.get_or_try_init(|| open_relational(name, cfg)).await?;
        Ok(handle.clone())
    }

    /// Open (once) and return the document backend `name`.
    ///
    /// # Errors
    /// `DbError::NotConfigured` for an unknown name, or an `external`
    /// engine nobody registered.
    pub async fn document(&self, name: &str) -> Result<Arc<dyn DocumentStore>> {
        let cfg = self
            .config
            .document
            .get(name)
            .ok_or_else(|| DbError::NotConfigured(format!("document backend '{name}'")))?;
        let cell = self
            .document
            .entry(name.to_owned())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();
        let store = cell
            .get_or_try_init(|| async { self.open_document(name, cfg.engine, cfg.max_document_bytes) })
            .await?;
        Ok(Arc::clone(store))
    }

    fn open_document(
        &self,
        name: &str,
        engine: DocumentEngine,
        max_document_bytes: Option<usize>,
    ) -> Result<Arc<dyn DocumentStore>> {
        let store: Arc<dyn DocumentStore> = match engine {
            DocumentEngine::Memory => {
                let mut store = InMemoryDocumentStore::new();
                if let Some(max) = max_document_bytes {
                    store = store.with_max_document_bytes(max);
                }
                Arc::new(store)
            }
            DocumentEngine::External => self
                .external
                .get(name)
                .map(|s| Arc::clone(s.value()))
                .ok_or_else(|| DbError::NotConfigured(format!("document backend '{name}' has no registered store")))?,
        };
        tracing::info!(backend = name, ?engine, "document backend opened");
        Ok(store)
    }
}

async fn open_relational(name: &str, cfg: &RelationalConfig) -> Result<DbHandle> {
    let raw = cfg
        .dsn
        .as_deref()
        .ok_or_else(|| DbError::NotConfigured(format!("relational backend '{name}' has no dsn")))?;
    let dsn = expand_env_vars(raw)?;
    let redacted = redact_credentials_in_dsn(Some(&dsn));
    tracing::info!(backend = name, dsn = %redacted, "opening relational backend");

    let handle = DbHandle::connect(&dsn, cfg.pool.connect_opts())
        .await
        .inspect_err(|e| tracing::error!(backend = name, dsn = %redacted, error = %e, "relational backend failed to open"))?;

    if cfg.auto_migrate {
        use sea_orm_migration::MigratorTrait;
        Migrator::up(handle.sea(), None).await?;
        tracing::info!(backend = name, "listing tables migrated");
    }
    Ok(handle)
}
