//! Media storage for uploaded resource files.
//!
//! Uploaded files are handed to a [`MediaStore`], which returns the public
//! URL the file can be fetched from. Deletion is keyed by the public id,
//! which is derived from that URL with [`public_id_from_url`].

mod cloudinary;
mod local;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{StorageBackend, StorageConfig};
use crate::Result;

pub use cloudinary::CloudinaryStore;
pub use local::LocalStore;

/// A remote (or local) home for uploaded media.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Upload the file at `path` and return its public URL.
    async fn upload(&self, path: &Path) -> Result<String>;

    /// Delete the stored file identified by `public_id`.
    async fn delete(&self, public_id: &str) -> Result<()>;

    /// Delete the stored file served at `url`.
    async fn delete_url(&self, url: &str) -> Result<()> {
        self.delete(&public_id_from_url(url)).await
    }

    /// Short backend name for logs.
    fn name(&self) -> &'static str;
}

/// Build the configured media store.
pub fn from_config(config: &StorageConfig) -> Result<Arc<dyn MediaStore>> {
    let store: Arc<dyn MediaStore> = match config.backend {
        StorageBackend::Local => Arc::new(LocalStore::new(
            &config.local.path,
            &config.local.public_base_url,
        )?),
        StorageBackend::Cloudinary => Arc::new(CloudinaryStore::new(&config.cloudinary)?),
    };
    Ok(store)
}

/// Derive the public id of a stored file from its URL.
///
/// The public id is the last path segment up to its first `.`, so
/// `https://host/a/b/abc123.jpg` yields `abc123`.
pub fn public_id_from_url(url: &str) -> String {
    let last_segment = match url::Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back().map(str::to_string))
            .unwrap_or_default(),
        Err(_) => url.rsplit('/').next().unwrap_or_default().to_string(),
    };

    last_segment
        .split('.')
        .next()
        .unwrap_or_default()
        .to_string()
}
