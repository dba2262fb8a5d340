//! Filesystem-backed media store.
//!
//! Files are copied into a sharded directory tree keyed by the first two
//! characters of a fresh UUID:
//! ```text
//! {base_path}/
//! ├── ab/
//! │   └── ab12cd34-5678-90ab-cdef-123456789012.pdf
//! └── ...
//! ```
//! The public URL mirrors that layout under `public_base_url`.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use super::MediaStore;
use crate::{ClassHubError, Result};

/// Media store writing into a local directory.
#[derive(Debug, Clone)]
pub struct LocalStore {
    base_path: PathBuf,
    public_base_url: String,
}

impl LocalStore {
    /// Create a store rooted at `base_path`, creating the directory if needed.
    pub fn new(base_path: impl Into<PathBuf>, public_base_url: &str) -> Result<Self> {
        let base_path = base_path.into();
        std::fs::create_dir_all(&base_path)?;

        Ok(Self {
            base_path,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Root directory of the store.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn shard(name: &str) -> &str {
        name.get(..2).unwrap_or(name)
    }

    fn extension(path: &Path) -> &str {
        path.extension().and_then(|s| s.to_str()).unwrap_or("bin")
    }

    /// Full path of a stored file name.
    pub fn file_path(&self, stored_name: &str) -> PathBuf {
        self.base_path.join(Self::shard(stored_name)).join(stored_name)
    }
}

#[async_trait]
impl MediaStore for LocalStore {
    async fn upload(&self, path: &Path) -> Result<String> {
        let stored_name = format!("{}.{}", Uuid::new_v4(), Self::extension(path));
        let target = self.file_path(&stored_name);

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::copy(path, &target).await.map_err(|e| {
            ClassHubError::Storage(format!("failed to store {}: {e}", path.display()))
        })?;

        debug!(stored_name = %stored_name, "Stored media file");
        Ok(format!(
            "{}/{}/{}",
            self.public_base_url,
            Self::shard(&stored_name),
            stored_name
        ))
    }

    async fn delete(&self, public_id: &str) -> Result<()> {
        if public_id.is_empty() || public_id.contains(['/', '\\', '.']) {
            return Err(ClassHubError::Storage(format!("invalid public id: {public_id:?}")));
        }

        let shard_dir = self.base_path.join(Self::shard(public_id));
        let mut entries = match tokio::fs::read_dir(&shard_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ClassHubError::Storage(format!("{public_id} not found")));
            }
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let stem = path.file_stem().and_then(|s| s.to_str());
            if stem == Some(public_id) {
                tokio::fs::remove_file(&path).await?;
                debug!(public_id, "Deleted media file");
                return Ok(());
            }
        }

        Err(ClassHubError::Storage(format!("{public_id} not found")))
    }

    fn name(&self) -> &'static str {
        "local"
    }
}
