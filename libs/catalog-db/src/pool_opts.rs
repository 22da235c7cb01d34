//! Pool sizing shared by every relational engine.

use std::time::Duration;

/// Knobs applied to the sqlx pool before connecting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectOpts {
    pub max_conns: Option<u32>,
    pub min_conns: Option<u32>,
    pub acquire_timeout: Option<Duration>,
    pub idle_timeout: Option<Duration>,
    pub max_lifetime: Option<Duration>,
}

impl Default for ConnectOpts {
    fn default() -> Self {
        Self {
            max_conns: Some(10),
            min_conns: None,
            acquire_timeout: Some(Duration::from_secs(30)),
            idle_timeout: None,
            max_lifetime: None,
        }
    }
}

/// Apply [`ConnectOpts`] to one engine's pool builder.
pub(crate) trait ApplyPoolOpts {
    fn apply(self, opts: &ConnectOpts) -> Self;
}

macro_rules! impl_apply_pool_opts {
    ($($feature:literal => $builder:ty),+ $(,)?) => {$(
        #[cfg(feature = $feature)]
        impl ApplyPoolOpts for $builder {
            fn apply(mut self, opts: &ConnectOpts) -> Self {
                if let Some(n) = opts.max_conns {
                    self = self.max_connections(n);
                }
                if let Some(n) = opts.min_conns {
                    self = self.min_connections(n);
                }
                if let Some(t) = opts.acquire_timeout {
                    self = self.acquire_timeout(t);
                }
                if let Some(t) = opts.idle_timeout {
                    self = self.idle_timeout(t);
                }
                if let Some(t) = opts.max_lifetime {
                    self = self.max_lifetime(t);
                }
                self
            }
        }
    )+};
}

impl_apply_pool_opts! {
    "pg" => sea_orm::sqlx::postgres::PgPoolOptions,
    "mysql" => sea_orm::sqlx::mysql::MySqlPoolOptions,
    "sqlite" => sea_orm::sqlx::sqlite::SqlitePoolOptions,
}
