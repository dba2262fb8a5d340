//! Best-effort resource upload and deletion.
//!
//! Files are pushed to the media store one at a time in input order. A
//! failure for one file is recorded and the batch carries on; only a batch
//! in which every file fails is an error. Deletion works the same way over
//! a resource's stored files, and the record is removed regardless.

use std::path::PathBuf;

use tracing::{info, warn};

use super::repository::ResourceRepository;
use super::types::{NewResource, Resource};
use crate::classroom::ClassroomRepository;
use crate::db::DbPool;
use crate::storage::{public_id_from_url, MediaStore};
use crate::{ClassHubError, Result};

/// Maximum number of files accepted in one upload.
pub const MAX_FILES_PER_UPLOAD: usize = 10;

/// An upload request whose files are already on local disk.
#[derive(Debug, Clone)]
pub struct NewResourceUpload {
    pub title: String,
    pub text: String,
    pub classroom_id: Option<i64>,
    /// Local paths of the files to upload, in order.
    pub files: Vec<PathBuf>,
}

/// Result of an upload batch that stored at least one file.
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub resource: Resource,
    /// Local paths of files the store rejected.
    pub failed_uploads: Vec<String>,
}

/// A stored file that could not be deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedDeletion {
    pub public_id: String,
    pub error: String,
}

/// Result of deleting a resource.
#[derive(Debug, Clone)]
pub struct DeletionOutcome {
    pub deleted_resource_id: i64,
    /// Public ids deleted from the store.
    pub successful: Vec<String>,
    pub failed: Vec<FailedDeletion>,
}

impl DeletionOutcome {
    /// Whether every stored file was deleted.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Resource operations spanning the database and the media store.
pub struct ResourceService<'a> {
    pool: &'a DbPool,
    store: &'a dyn MediaStore,
}

impl<'a> ResourceService<'a> {
    pub fn new(pool: &'a DbPool, store: &'a dyn MediaStore) -> Self {
        Self { pool, store }
    }

    fn repo(&self) -> ResourceRepository<'a> {
        ResourceRepository::new(self.pool)
    }

    /// Upload a batch of files and record them as one resource.
    pub async fn upload(&self, owner_id: i64, upload: NewResourceUpload) -> Result<UploadOutcome> {
        if upload.files.is_empty() {
            return Err(ClassHubError::Validation("No resources provided".to_string()));
        }
        if upload.files.len() > MAX_FILES_PER_UPLOAD {
            return Err(ClassHubError::Validation(format!(
                "Maximum {MAX_FILES_PER_UPLOAD} files allowed"
            )));
        }

        let title = upload.title.trim();
        if title.is_empty() {
            return Err(ClassHubError::Validation("Title is required".to_string()));
        }

        if let Some(classroom_id) = upload.classroom_id {
            if !ClassroomRepository::new(self.pool).exists(classroom_id).await? {
                return Err(ClassHubError::NotFound("classroom".to_string()));
            }
        }

        let mut urls = Vec::with_capacity(upload.files.len());
        let mut failed_uploads = Vec::new();

        for path in &upload.files {
            match self.store.upload(path).await {
                Ok(url) => urls.push(url),
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        store = self.store.name(),
                        error = %e,
                        "File upload failed"
                    );
                    failed_uploads.push(path.display().to_string());
                }
            }
        }

        if urls.is_empty() {
            return Err(ClassHubError::Validation(
                "All file uploads failed".to_string(),
            ));
        }

        let new_resource = NewResource::new(owner_id, title, urls)
            .with_text(upload.text.trim())
            .in_classroom(upload.classroom_id);
        let resource = self.repo().create(&new_resource).await?;

        info!(
            resource_id = resource.id,
            owner_id,
            stored = resource.urls.len(),
            failed = failed_uploads.len(),
            "Resource uploaded"
        );
        Ok(UploadOutcome {
            resource,
            failed_uploads,
        })
    }

    /// Search resources by title and text.
    ///
    /// An empty query is a validation error; no matches is `NotFound`.
    pub async fn search_by_title(&self, title: &str) -> Result<Vec<Resource>> {
        if title.trim().is_empty() {
            return Err(ClassHubError::Validation("Title is required".to_string()));
        }

        let found = self.repo().search(title).await?;
        if found.is_empty() {
            return Err(ClassHubError::NotFound("resource".to_string()));
        }
        Ok(found)
    }

    /// Resources uploaded by `owner_id`, newest first.
    pub async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<Resource>> {
        self.repo().list_by_owner(owner_id).await
    }

    /// Delete a resource and, best effort, its stored files.
    ///
    /// Only the owner may delete. Store failures are collected, never
    /// retried, and do not keep the record alive.
    pub async fn delete(&self, requester_id: i64, id: i64) -> Result<DeletionOutcome> {
        let resource = self
            .repo()
            .get_by_id(id)
            .await?
            .ok_or_else(|| ClassHubError::NotFound("resource".to_string()))?;

        if resource.owner_id != requester_id {
            return Err(ClassHubError::Permission(
                "You are not authorized to delete this resource".to_string(),
            ));
        }

        let mut successful = Vec::new();
        let mut failed = Vec::new();

        for url in &resource.urls {
            let public_id = public_id_from_url(url);
            match self.store.delete_url(url).await {
                Ok(()) => successful.push(public_id),
                Err(e) => {
                    warn!(
                        resource_id = id,
                        public_id = %public_id,
                        error = %e,
                        "Failed to delete file from store"
                    );
                    failed.push(FailedDeletion {
                        public_id,
                        error: e.to_string(),
                    });
                }
            }
        }

        self.repo().delete(id).await?;

        info!(
            resource_id = id,
            deleted = successful.len(),
            failed = failed.len(),
            "Resource deleted"
        );
        Ok(DeletionOutcome {
            deleted_resource_id: id,
            successful,
            failed,
        })
    }
}
