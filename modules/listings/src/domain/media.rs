//! Inline asset handling for the upsert pipeline.
//!
//! Admin payloads may embed an image as a `data:<mime>;base64,<data>` URI.
//! The pipeline decodes it, hands the bytes to a [`MediaUploader`] and
//! stores the returned URL instead.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use super::error::DomainError;

/// Decoded inline asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineAsset {
    pub mime: mime::Mime,
    pub bytes: Vec<u8>,
}

impl InlineAsset {
    /// File extension for the asset's media type.
    #[must_use]
    pub fn extension(&self) -> &str {
        let subtype = self.mime.subtype().as_str();
        match subtype {
            "jpeg" => "jpg",
            s if !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric()) => s,
            _ => "bin",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("media uploads are not configured")]
    Disabled,

    #[error("upstream rejected the asset ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<UploadError> for DomainError {
    fn from(e: UploadError) -> Self {
        let status = match &e {
            UploadError::Rejected { status, .. } => Some(*status),
            UploadError::Disabled | UploadError::Io(_) => None,
        };
        DomainError::UpstreamAsset {
            status,
            message: e.to_string(),
        }
    }
}

/// External media store.
#[async_trait]
pub trait MediaUploader: Send + Sync {
    /// Store the asset under `folder` and return its public URL.
    async fn upload(&self, folder: &str, asset: InlineAsset) -> Result<String, UploadError>;
}

/// Parse a `data:` URI. `Ok(None)` when the value is not one.
///
/// # Errors
/// `DomainError::Validation` for a `data:` URI that is not base64 or has
/// an unparsable media type.
pub fn parse_data_uri(field: &str, value: &str) -> Result<Option<InlineAsset>, DomainError> {
    let Some(rest) = value.strip_prefix("data:") else {
        return Ok(None);
    };
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| DomainError::validation(field, "data URI has no payload"))?;
    let media_type = header
        .strip_suffix(";base64")
        .ok_or_else(|| DomainError::validation(field, "only base64 data URIs are accepted"))?;
    let mime: mime::Mime = media_type
        .parse()
        .map_err(|_| DomainError::validation(field, format!("invalid media type '{media_type}'")))?;
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| DomainError::validation(field, format!("invalid base64 payload: {e}")))?;
    Ok(Some(InlineAsset { mime, bytes }))
}
