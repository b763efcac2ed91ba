//! Asset relay: moves generated images from the generation backend's
//! transient URLs into durable object storage.
//!
//! Generated assets live on short-lived delivery URLs. The relay downloads
//! each one into the local upload directory, republishes it under the
//! canonical storage key, and removes the transient copy.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::common::utils::sanitize_member_id;

use super::traits::{BaseAssetRelay, BaseObjectStore};

/// Root prefix for every object this service writes.
pub const STORAGE_ROOT: &str = "webtoon-ai";

pub struct AssetRelay {
    http: reqwest::Client,
    store: Arc<dyn BaseObjectStore>,
    upload_dir: PathBuf,
}

impl AssetRelay {
    pub fn new(store: Arc<dyn BaseObjectStore>, upload_dir: PathBuf) -> Self {
        Self {
            http: reqwest::Client::new(),
            store,
            upload_dir,
        }
    }

    /// Canonical storage key for a published asset.
    ///
    /// Profile images share one fixed, overwritable name per member; webtoon
    /// images keep their basename under a per-date folder.
    fn object_key(
        &self,
        owner_id: &str,
        date: Option<&str>,
        basename: &str,
        is_profile: bool,
    ) -> Option<String> {
        let owner = sanitize_member_id(owner_id);
        if owner.is_empty() {
            error!(owner_id, "member id is empty after sanitization");
            return None;
        }

        if is_profile {
            Some(format!("{}/{}/temp_profile.webp", STORAGE_ROOT, owner))
        } else if let Some(date) = date {
            Some(format!("{}/{}/{}/{}", STORAGE_ROOT, owner, date, basename))
        } else {
            error!("either a date must be provided for webtoon images or is_profile must be set");
            None
        }
    }
}

#[async_trait]
impl BaseAssetRelay for AssetRelay {
    async fn relay(&self, remote_url: &str, name_hint: &str) -> Result<PathBuf> {
        let response = self
            .http
            .get(remote_url)
            .send()
            .await
            .with_context(|| format!("failed to download {}", remote_url))?;

        let status = response.status();
        if !status.is_success() {
            bail!("download of {} failed with status {}", remote_url, status);
        }

        let bytes = response
            .bytes()
            .await
            .with_context(|| format!("failed to read body of {}", remote_url))?;

        tokio::fs::create_dir_all(&self.upload_dir)
            .await
            .context("failed to create upload directory")?;

        let file_path = self
            .upload_dir
            .join(format!("{}.webp", sanitize_member_id(name_hint)));
        tokio::fs::write(&file_path, &bytes)
            .await
            .with_context(|| format!("failed to write {}", file_path.display()))?;

        info!("file downloaded successfully and saved to {}", file_path.display());
        Ok(file_path)
    }

    async fn publish(
        &self,
        local_path: &Path,
        owner_id: &str,
        date: Option<&str>,
        is_profile: bool,
    ) -> Option<String> {
        let basename = local_path.file_name()?.to_string_lossy().to_string();
        let key = self.object_key(owner_id, date, &basename, is_profile)?;

        let bytes = match tokio::fs::read(local_path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(
                    path = %local_path.display(),
                    error = %e,
                    "transient file is unreadable, nothing to publish"
                );
                return None;
            }
        };

        let result = self.store.put_object(&key, bytes, "image/webp").await;

        // The transient copy is done either way; keep the upload dir clean.
        if let Err(e) = tokio::fs::remove_file(local_path).await {
            warn!(path = %local_path.display(), error = %e, "failed to delete transient file");
        }

        match result {
            Ok(url) => {
                info!("image successfully uploaded to {}", url);
                Some(url)
            }
            Err(e) => {
                error!(key = %key, error = %format!("{e:#}"), "error uploading image to object storage");
                None
            }
        }
    }

    fn folder_url(&self, owner_id: &str, date: &str) -> String {
        let owner = sanitize_member_id(owner_id);
        self.store
            .public_url(&format!("{}/{}/{}/", STORAGE_ROOT, owner, date))
    }
}
