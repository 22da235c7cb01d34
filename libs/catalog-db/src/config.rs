//! `database:` section of the service configuration.
//!
//! ```yaml
//! database:
//!   relational:
//!     main:
//!       dsn: "postgres://catalog:${CATALOG_DB_PASSWORD}@db/catalog"
//!       pool: { max_conns: 10, acquire_timeout: "30s" }
//!       auto_migrate: true
//!   document:
//!     content:
//!       engine: memory
//! ```

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{DbError, Result};
use crate::pool_opts::ConnectOpts;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Named relational backends.
    pub relational: BTreeMap<String, RelationalConfig>,
    /// Named document backends.
    pub document: BTreeMap<String, DocumentConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RelationalConfig {
    /// `sqlite:`, `postgres://` or `mysql://`; `${VAR}` is expanded.
    pub dsn: Option<String>,
    pub pool: PoolCfg,
    /// Create listing tables on first connect.
    pub auto_migrate: bool,
}

impl Default for RelationalConfig {
    fn default() -> Self {
        Self {
            dsn: None,
            pool: PoolCfg::default(),
            auto_migrate: true,
        }
    }
}

impl RelationalConfig {
    #[must_use]
    pub fn with_dsn(dsn: impl Into<String>) -> Self {
        Self {
            dsn: Some(dsn.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolCfg {
    pub max_conns: Option<u32>,
    pub min_conns: Option<u32>,
    #[serde(with = "humantime_serde")]
    pub acquire_timeout: Option<Duration>,
    #[serde(with = "humantime_serde")]
    pub idle_timeout: Option<Duration>,
    #[serde(with = "humantime_serde")]
    pub max_lifetime: Option<Duration>,
}

impl PoolCfg {
    /// Overlay the configured knobs on the library defaults.
    #[must_use]
    pub fn connect_opts(&self) -> ConnectOpts {
        let defaults = ConnectOpts::default();
        ConnectOpts {
            max_conns: self.max_conns.or(defaults.max_conns),
            min_conns: self.min_conns.or(defaults.min_conns),
            acquire_timeout: self.acquire_timeout.or(defaults.acquire_timeout),
            idle_timeout: self.idle_timeout.or(defaults.idle_timeout),
            max_lifetime: self.max_lifetime.or(defaults.max_lifetime),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentEngine {
    /// Process-local engine; contents are lost on restart.
    #[default]
    Memory,
    /// Supplied by the host through `BackendRegistry::register_document_store`.
    External,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DocumentConfig {
    pub engine: DocumentEngine,
    /// Per-document size cap for the memory engine.
    pub max_document_bytes: Option<usize>,
}

/// Replace every `${VAR}` with the environment value.
///
/// # Errors
/// `DbError::EnvVar` when a referenced variable is unset.
pub fn expand_env_vars(input: &str) -> Result<String> {
    let re = regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}")
        .map_err(|e| DbError::InvalidConfig(e.to_string()))?;
    let mut result = input.to_owned();
    for caps in re.captures_iter(input) {
        let value = std::env::var(&caps[1])?;
        result = result.replace(&caps[0], &value);
    }
    Ok(result)
}

/// DSN safe for logs: the password component becomes `***`.
#[must_use]
pub fn redact_credentials_in_dsn(dsn: Option<&str>) -> String {
    match dsn {
        Some(dsn) if dsn.contains('@') => match url::Url::parse(dsn) {
            Ok(mut parsed) => {
                if parsed.password().is_some() {
                    let _ = parsed.set_password(Some("***"));
                }
                parsed.to_string()
            }
            Err(_) => "***".to_owned(),
        },
        Some(dsn) => dsn.to_owned(),
        None => "none".to_owned(),
    }
}
