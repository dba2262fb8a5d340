//! Shared resources: titled uploads of one or more files.

mod repository;
mod service;
mod types;

pub use repository::{fts_query, ResourceRepository};
pub use service::{
    DeletionOutcome, FailedDeletion, NewResourceUpload, ResourceService, UploadOutcome,
    MAX_FILES_PER_UPLOAD,
};
pub use types::{NewResource, Resource};
