use std::path::PathBuf;

use async_trait::async_trait;

use crate::domain::media::{InlineAsset, MediaUploader, UploadError};

/// Stores uploads on the local filesystem under `dir/<folder>/`.
pub struct FsMediaUploader {
    dir: PathBuf,
    base_url: String,
}

impl FsMediaUploader {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl MediaUploader for FsMediaUploader {
    async fn upload(&self, folder: &str, asset: InlineAsset) -> Result<String, UploadError> {
        let target = self.dir.join(folder);
        tokio::fs::create_dir_all(&target).await?;

        let file_name = format!("{}.{}", uuid::Uuid::new_v4(), asset.extension());
        tokio::fs::write(target.join(&file_name), &asset.bytes).await?;

        Ok(format!("{}/{folder}/{file_name}", self.base_url.trim_end_matches('/')))
    }
}

/// Used when no media storage is configured.
pub struct DisabledMediaUploader;

#[async_trait]
impl MediaUploader for DisabledMediaUploader {
    async fn upload(&self, _folder: &str, _asset: InlineAsset) -> Result<String, UploadError> {
        Err(UploadError::Disabled)
    }
}
