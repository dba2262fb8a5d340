//! Resource handlers.
//!
//! Multipart uploads are spooled into the configured temp directory, handed
//! to the resource service as local paths, and removed once the batch is
//! done whatever its outcome.

use axum::extract::{Multipart, Path, State};
use std::path::{Path as FsPath, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

use crate::resource::{NewResourceUpload, ResourceService, MAX_FILES_PER_UPLOAD};
use crate::web::dto::{
    ApiResponse, DeleteResourceResponse, ResourceResponse, ResourceSearchRequest,
    UploadResponse, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::middleware::AuthUser;

use super::classroom::parse_id;
use super::AppState;

/// Multipart field carrying the uploaded files.
pub const RESOURCE_FIELD: &str = "resource";

/// Keep only characters that are safe in a file name.
fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.').to_string();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

/// The parsed multipart form.
#[derive(Default)]
struct UploadForm {
    title: String,
    text: String,
    classroom_id: Option<String>,
    files: Vec<PathBuf>,
}

async fn remove_spooled(files: &[PathBuf]) {
    for path in files {
        if let Err(e) = tokio::fs::remove_file(path).await {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove temp file");
        }
    }
}

async fn spool_field(
    field: &mut axum::extract::multipart::Field<'_>,
    temp_dir: &FsPath,
    max_file_size: usize,
) -> Result<PathBuf, ApiError> {
    let name = sanitize_file_name(field.file_name().unwrap_or("upload"));
    let path = temp_dir.join(format!("{}_{}", uuid::Uuid::new_v4(), name));

    let mut file = tokio::fs::File::create(&path).await.map_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "Failed to create temp file");
        ApiError::internal("Failed to receive upload")
    })?;

    let mut written = 0usize;
    loop {
        let chunk = match field.chunk().await {
            Ok(Some(chunk)) => chunk,
            Ok(None) => break,
            Err(e) => {
                drop(file);
                remove_spooled(std::slice::from_ref(&path)).await;
                return Err(ApiError::bad_request(format!("Invalid multipart body: {}", e.body_text())));
            }
        };

        written += chunk.len();
        if written > max_file_size {
            drop(file);
            remove_spooled(std::slice::from_ref(&path)).await;
            return Err(ApiError::bad_request(format!(
                "File {name} exceeds the maximum size of {} MB",
                max_file_size / (1024 * 1024)
            )));
        }

        if let Err(e) = file.write_all(&chunk).await {
            drop(file);
            remove_spooled(std::slice::from_ref(&path)).await;
            tracing::error!(error = %e, "Failed to write temp file");
            return Err(ApiError::internal("Failed to receive upload"));
        }
    }

    file.flush().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to flush temp file");
        ApiError::internal("Failed to receive upload")
    })?;

    Ok(path)
}

async fn read_form(
    multipart: &mut Multipart,
    form: &mut UploadForm,
    temp_dir: &FsPath,
    max_file_size: usize,
) -> Result<(), ApiError> {
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e.body_text())))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == RESOURCE_FIELD {
            // Stop spooling past the limit; the count check still rejects the batch.
            if form.files.len() > MAX_FILES_PER_UPLOAD {
                continue;
            }
            let path = spool_field(&mut field, temp_dir, max_file_size).await?;
            form.files.push(path);
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e.body_text())))?;
        match name.as_str() {
            "title" => form.title = value,
            "text" => form.text = value,
            "classroomId" => form.classroom_id = Some(value).filter(|v| !v.trim().is_empty()),
            _ => {}
        }
    }
    Ok(())
}

async fn handle_upload(
    state: &AppState,
    owner_id: i64,
    path_classroom_id: Option<String>,
    mut multipart: Multipart,
) -> Result<ApiResponse<UploadResponse>, ApiError> {
    tokio::fs::create_dir_all(&state.upload_temp_dir)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to create upload temp dir");
            ApiError::internal("Failed to receive upload")
        })?;

    let mut form = UploadForm::default();
    let read = read_form(
        &mut multipart,
        &mut form,
        &state.upload_temp_dir,
        state.max_file_size,
    )
    .await;

    let result = async {
        read?;

        let classroom_id = path_classroom_id
            .or(form.classroom_id.take())
            .map(|raw| parse_id(&raw, "classroom"))
            .transpose()?;

        let upload = NewResourceUpload {
            title: std::mem::take(&mut form.title),
            text: std::mem::take(&mut form.text),
            classroom_id,
            files: form.files.clone(),
        };

        let outcome = ResourceService::new(state.pool(), state.media_store.as_ref())
            .upload(owner_id, upload)
            .await?;
        let (response, message) = UploadResponse::from_outcome(outcome);
        Ok::<_, ApiError>(ApiResponse::ok(response, message))
    }
    .await;

    remove_spooled(&form.files).await;
    result
}

/// POST /api/resources
pub async fn upload_resource(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    multipart: Multipart,
) -> Result<ApiResponse<UploadResponse>, ApiError> {
    handle_upload(&state, auth.id(), None, multipart).await
}

/// POST /api/resources/:id - Upload into the classroom with this ID.
pub async fn upload_resource_to_classroom(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(classroom_id): Path<String>,
    multipart: Multipart,
) -> Result<ApiResponse<UploadResponse>, ApiError> {
    handle_upload(&state, auth.id(), Some(classroom_id), multipart).await
}

/// GET /api/resources/search - JSON body `{title}`.
pub async fn search_resources(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    ValidatedJson(req): ValidatedJson<ResourceSearchRequest>,
) -> Result<ApiResponse<Vec<ResourceResponse>>, ApiError> {
    let resources = ResourceService::new(state.pool(), state.media_store.as_ref())
        .search_by_title(&req.title)
        .await?;

    Ok(ApiResponse::ok(
        resources.into_iter().map(Into::into).collect(),
        "Resources found",
    ))
}

/// GET /api/resources/mine
pub async fn my_resources(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<ApiResponse<Vec<ResourceResponse>>, ApiError> {
    let resources = ResourceService::new(state.pool(), state.media_store.as_ref())
        .list_by_owner(auth.id())
        .await?;

    Ok(ApiResponse::ok(
        resources.into_iter().map(Into::into).collect(),
        "Resources fetched successfully",
    ))
}

/// DELETE /api/resources/:id
pub async fn delete_resource(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<ApiResponse<DeleteResourceResponse>, ApiError> {
    let id = parse_id(&id, "resource")?;
    let outcome = ResourceService::new(state.pool(), state.media_store.as_ref())
        .delete(auth.id(), id)
        .await?;

    let (response, message) = DeleteResourceResponse::from_outcome(outcome);
    Ok(ApiResponse::ok(response, message))
}
