use std::borrow::Cow;

use catalog_query::ListingSchema;
use sea_orm::{DbErr, RuntimeErr, SqlErr};
use thiserror::Error;

use crate::document::DocumentStoreError;

/// Library-local result type.
pub type Result<T> = std::result::Result<T, DbError>;

/// Failures while resolving or opening a backend.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Backend not configured: {0}")]
    NotConfigured(String),

    #[error("Unknown DSN: {0}")]
    UnknownDsn(String),

    #[error("Feature not enabled: {0}")]
    FeatureDisabled(&'static str),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error(transparent)]
    Sqlx(#[from] sea_orm::sqlx::Error),

    #[error(transparent)]
    Sea(#[from] DbErr),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DbError {
    /// True when the failure is a deployment problem rather than a
    /// transient backend fault.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            DbError::NotConfigured(_)
                | DbError::UnknownDsn(_)
                | DbError::FeatureDisabled(_)
                | DbError::InvalidConfig(_)
                | DbError::EnvVar(_)
        )
    }
}

/// Failures of a single read or write against an opened backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate value for unique field '{field}'")]
    UniqueViolation { field: String },

    #[error("value too large: {0}")]
    ValueTooLarge(String),

    #[error("invalid query: {0}")]
    Query(String),

    #[error(transparent)]
    Db(#[from] DbErr),

    #[error(transparent)]
    Document(#[from] DocumentStoreError),
}

/// SQLSTATE for "string data, right truncation".
const SQLSTATE_RIGHT_TRUNCATION: &str = "22001";
/// MySQL "data too long for column".
const MYSQL_DATA_TOO_LONG: &str = "1406";

fn database_code(err: &DbErr) -> Option<String> {
    let runtime = match err {
        DbErr::Exec(r) | DbErr::Query(r) | DbErr::Conn(r) => r,
        _ => return None,
    };
    match runtime {
        RuntimeErr::SqlxError(sea_orm::sqlx::Error::Database(db)) => db.code().map(Cow::into_owned),
        _ => None,
    }
}

impl StoreError {
    /// Classify a relational error against the schema it was raised for.
    ///
    /// Unique-index violations name the offending column when the driver
    /// message mentions one of `schema.unique`.
    #[must_use]
    pub fn from_db(err: DbErr, schema: &ListingSchema) -> Self {
        if let Some(SqlErr::UniqueConstraintViolation(message)) = err.sql_err() {
            let field = schema
                .unique
                .iter()
                .find(|col| message.contains(*col))
                .map_or_else(|| "unknown".to_owned(), |col| (*col).to_owned());
            return StoreError::UniqueViolation { field };
        }
        if let Some(code) = database_code(&err)
            && (code == SQLSTATE_RIGHT_TRUNCATION || code == MYSQL_DATA_TOO_LONG)
        {
            return StoreError::ValueTooLarge(err.to_string());
        }
        StoreError::Db(err)
    }

    /// Classify a document store error.
    #[must_use]
    pub fn from_document(err: DocumentStoreError) -> Self {
        match err {
            DocumentStoreError::DuplicateKey { field } => StoreError::UniqueViolation { field },
            DocumentStoreError::DocumentTooLarge { size, max } => {
                StoreError::ValueTooLarge(format!("document of {size} bytes exceeds {max}"))
            }
            other => StoreError::Document(other),
        }
    }
}
