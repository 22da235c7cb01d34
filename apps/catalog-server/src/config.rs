//! Layered application configuration.
//!
//! Precedence, lowest first: built-in defaults, the YAML file given with
//! `--config`, `CATALOG__*` environment variables (`__` separates nesting
//! levels), then CLI flags.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use catalog_db::config::{DocumentConfig, RelationalConfig};
use catalog_db::DatabaseConfig;
use catalog_listings::ListingsConfig;
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};

pub const ENV_PREFIX: &str = "CATALOG__";
const MOCK_RELATIONAL_DSN: &str = "sqlite::memory:";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Working directory for the default `SQLite` file and relative media
    /// paths. `~` is expanded.
    #[serde(default = "default_home_dir")]
    pub home_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            home_dir: default_home_dir(),
        }
    }
}

fn default_bind_addr() -> String {
    "127.0.0.1:8087".to_owned()
}

fn default_home_dir() -> String {
    "~/.catalog".to_owned()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `info,catalog_db=debug`.
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::Text,
        }
    }
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Absent means a local `SQLite` file plus the in-memory document engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub listings: ListingsConfig,
}

/// CLI flags that override configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct CliOverrides {
    pub port: Option<u16>,
    pub verbose: u8,
    pub mock: bool,
}

impl AppConfig {
    /// Defaults, then the YAML file (if any), then the environment.
    ///
    /// # Errors
    /// Unparsable YAML, unknown keys, or values of the wrong type.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file_exact(path));
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        figment
            .extract()
            .context("failed to load configuration (check the yaml file and CATALOG__* variables)")
    }

    pub fn apply_cli_overrides(&mut self, cli: CliOverrides) {
        if let Some(port) = cli.port {
            let host = self
                .server
                .bind_addr
                .rsplit_once(':')
                .map_or(self.server.bind_addr.as_str(), |(host, _)| host);
            self.server.bind_addr = format!("{host}:{port}");
        }
        match cli.verbose {
            0 => {}
            1 => "info".clone_into(&mut self.logging.level),
            2 => "debug".clone_into(&mut self.logging.level),
            _ => "trace".clone_into(&mut self.logging.level),
        }
        if cli.mock {
            self.database = Some(mock_database());
        }
    }

    /// `home_dir` with `~` expanded, created if missing.
    ///
    /// # Errors
    /// `HOME` unset for a `~` path, or the directory cannot be created.
    pub fn resolve_home_dir(&self) -> anyhow::Result<PathBuf> {
        let raw = self.server.home_dir.as_str();
        let path = match raw.strip_prefix('~') {
            Some(rest) => {
                let home = std::env::var("HOME")
                    .context("HOME is not set; cannot expand '~' in server.home_dir")?;
                PathBuf::from(home).join(rest.trim_start_matches('/'))
            }
            None => PathBuf::from(raw),
        };
        std::fs::create_dir_all(&path)
            .with_context(|| format!("cannot create home_dir {}", path.display()))?;
        Ok(path)
    }

    /// The effective `database` section: the configured one, or a `SQLite`
    /// file under `home_dir` and the in-memory document engine.
    #[must_use]
    pub fn database_or_default(&self, home_dir: &Path) -> DatabaseConfig {
        self.database.clone().unwrap_or_else(|| {
            let dsn = format!("sqlite://{}?mode=rwc", home_dir.join("catalog.db").display());
            tracing::info!(%dsn, "no database section configured; using local defaults");
            let mut db = DatabaseConfig::default();
            db.relational.insert("main".to_owned(), RelationalConfig::with_dsn(dsn));
            db.document.insert("content".to_owned(), DocumentConfig::default());
            db
        })
    }

    /// Media directories given relative to `home_dir` are anchored there.
    pub fn anchor_media_dir(&mut self, home_dir: &Path) {
        if let Some(media) = self.listings.media.as_mut()
            && media.dir.is_relative()
        {
            media.dir = home_dir.join(&media.dir);
        }
    }

    /// # Errors
    /// Serialization failure.
    pub fn to_yaml(&self) -> anyhow::Result<String> {
        serde_saphyr::to_string(self).context("failed to render configuration as yaml")
    }
}

/// Every backend the default listing bindings refer to, in memory.
fn mock_database() -> DatabaseConfig {
    let mut db = DatabaseConfig::default();
    db.relational
        .insert("main".to_owned(), RelationalConfig::with_dsn(MOCK_RELATIONAL_DSN));
    db.document.insert("content".to_owned(), DocumentConfig::default());
    db
}
