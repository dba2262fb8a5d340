//! Classroom handlers.

use axum::extract::{Path, Query, State};
use std::sync::Arc;

use crate::classroom::ClassroomService;
use crate::web::dto::{
    ApiResponse, ClassroomResponse, ClassroomSearchQuery, CreateClassroomRequest,
    UpdateClassroomRequest, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::middleware::AuthUser;

use super::AppState;

/// Parse a record ID path segment.
pub(crate) fn parse_id(raw: &str, what: &str) -> Result<i64, ApiError> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::bad_request(format!("Invalid {what} Id format")))
}

/// POST /api/classrooms
pub async fn create_classroom(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<CreateClassroomRequest>,
) -> Result<ApiResponse<ClassroomResponse>, ApiError> {
    let classroom = ClassroomService::new(state.pool())
        .create(auth.id(), &req.name, &req.university, &req.faculty, req.description)
        .await?;

    Ok(ApiResponse::created(
        classroom.into(),
        "Classroom created successfully",
    ))
}

/// GET /api/classrooms
pub async fn list_classrooms(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
) -> Result<ApiResponse<Vec<ClassroomResponse>>, ApiError> {
    let classrooms = ClassroomService::new(state.pool()).list().await?;

    Ok(ApiResponse::ok(
        classrooms.into_iter().map(Into::into).collect(),
        "Classrooms fetched successfully",
    ))
}

/// GET /api/classrooms/search?university=&faculty=
pub async fn search_classrooms(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    Query(query): Query<ClassroomSearchQuery>,
) -> Result<ApiResponse<Vec<ClassroomResponse>>, ApiError> {
    let classrooms = ClassroomService::new(state.pool())
        .search(&query.university, &query.faculty)
        .await?;

    Ok(ApiResponse::ok(
        classrooms.into_iter().map(Into::into).collect(),
        "Classrooms found",
    ))
}

/// PATCH /api/classrooms/:id
pub async fn update_classroom(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateClassroomRequest>,
) -> Result<ApiResponse<ClassroomResponse>, ApiError> {
    let id = parse_id(&id, "classroom")?;
    let classroom = ClassroomService::new(state.pool())
        .update(auth.id(), id, req.into())
        .await?;

    Ok(ApiResponse::ok(
        classroom.into(),
        "Classroom updated successfully",
    ))
}

/// DELETE /api/classrooms/:id
pub async fn delete_classroom(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<ApiResponse<ClassroomResponse>, ApiError> {
    let id = parse_id(&id, "classroom")?;
    let classroom = ClassroomService::new(state.pool())
        .delete(auth.id(), id)
        .await?;

    Ok(ApiResponse::ok(
        classroom.into(),
        "Classroom deleted successfully",
    ))
}
