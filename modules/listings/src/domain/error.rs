use catalog_db::{DbError, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Validation error on field '{field}': {message}")]
    Validation { field: String, message: String },

    #[error("Listing not found")]
    NotFound,

    #[error("Unknown listing kind '{0}'")]
    UnknownKind(String),

    #[error("Duplicate value for unique field '{field}'")]
    Conflict { field: String },

    #[error("Value too large: {message}")]
    OversizedField { field: Option<String>, message: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Media upload failed: {message}")]
    UpstreamAsset { status: Option<u16>, message: String },

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl DomainError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn oversized(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::OversizedField {
            field: Some(field.into()),
            message: message.into(),
        }
    }
}

impl From<StoreError> for DomainError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::UniqueViolation { field } => Self::Conflict { field },
            StoreError::ValueTooLarge(message) => Self::OversizedField { field: None, message },
            other => Self::Storage(anyhow::Error::new(other)),
        }
    }
}

impl From<DbError> for DomainError {
    fn from(e: DbError) -> Self {
        if e.is_configuration() {
            Self::Configuration(e.to_string())
        } else {
            Self::Storage(anyhow::Error::new(e))
        }
    }
}
