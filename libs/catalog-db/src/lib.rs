#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Storage backends for the content catalog.
//!
//! - [`relational`]: SQL compilation via `sea-query`, execution via `SeaORM`,
//!   and the migration that creates the listing tables
//! - [`document`]: operator-object filter compilation, the [`DocumentStore`]
//!   contract and an in-memory engine
//! - [`registry`]: named backends opened lazily from configuration
//!
//! # Features
//! - `sqlite` (default), `pg`, `mysql`: relational engines

#![cfg_attr(
    not(any(feature = "pg", feature = "mysql", feature = "sqlite")),
    allow(unused_imports, unused_variables, dead_code, unreachable_code, clippy::unused_async)
)]

pub mod config;
pub mod document;
pub mod error;
pub mod handle;
mod pool_opts;
pub mod registry;
pub mod relational;

pub use config::{
    DatabaseConfig, DocumentConfig, DocumentEngine, PoolCfg, RelationalConfig, expand_env_vars,
    redact_credentials_in_dsn,
};
pub use document::{DocumentQuery, DocumentStore, DocumentStoreError, InMemoryDocumentStore};
pub use error::{DbError, Result, StoreError};
pub use handle::{DbEngine, DbHandle};
pub use pool_opts::ConnectOpts;
pub use registry::BackendRegistry;
pub use relational::RelationalQuery;
