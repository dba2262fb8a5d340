//! Response DTOs for Web API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::classroom::Classroom;
use crate::datetime::to_rfc3339;
use crate::db::User;
use crate::resource::{DeletionOutcome, FailedDeletion, Resource, UploadOutcome};

/// Success envelope: `{statusCode, data, message, success}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub status_code: u16,
    pub data: T,
    pub message: String,
    pub success: bool,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a response with an explicit status.
    pub fn with_status(status: StatusCode, data: T, message: impl Into<String>) -> Self {
        Self {
            status_code: status.as_u16(),
            data,
            message: message.into(),
            success: status.as_u16() < 400,
        }
    }

    /// 200 OK.
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::OK, data, message)
    }

    /// 201 Created.
    pub fn created(data: T, message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::CREATED, data, message)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

// ============================================================================
// User DTOs
// ============================================================================

/// A user without credential material.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name.clone(),
            email: user.email.clone(),
            created_at: to_rfc3339(&user.created_at),
            updated_at: to_rfc3339(&user.updated_at),
        }
    }
}

// ============================================================================
// Classroom DTOs
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassroomResponse {
    pub id: i64,
    pub name: String,
    pub university: String,
    pub faculty: String,
    pub description: Option<String>,
    pub owner_id: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Classroom> for ClassroomResponse {
    fn from(classroom: Classroom) -> Self {
        Self {
            id: classroom.id,
            name: classroom.name,
            university: classroom.university,
            faculty: classroom.faculty,
            description: classroom.description,
            owner_id: classroom.owner_id,
            created_at: to_rfc3339(&classroom.created_at),
            updated_at: to_rfc3339(&classroom.updated_at),
        }
    }
}

// ============================================================================
// Resource DTOs
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceResponse {
    pub id: i64,
    pub owner_id: i64,
    pub classroom_id: Option<i64>,
    pub title: String,
    pub text: String,
    /// Public URLs of the stored files, in upload order.
    pub urls: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Resource> for ResourceResponse {
    fn from(resource: Resource) -> Self {
        Self {
            id: resource.id,
            owner_id: resource.owner_id,
            classroom_id: resource.classroom_id,
            title: resource.title,
            text: resource.text,
            urls: resource.urls,
            created_at: to_rfc3339(&resource.created_at),
            updated_at: to_rfc3339(&resource.updated_at),
        }
    }
}

/// Upload response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub resource: ResourceResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_uploads: Option<Vec<String>>,
}

impl UploadResponse {
    /// Build the response and its summary message.
    pub fn from_outcome(outcome: UploadOutcome) -> (Self, String) {
        let stored = outcome.resource.urls.len();
        let failed = outcome.failed_uploads.len();

        let message = if failed > 0 {
            format!("Successfully added {stored} resources ({failed} failed)")
        } else {
            format!("Successfully added {stored} resources")
        };

        let response = Self {
            resource: outcome.resource.into(),
            failed_uploads: (failed > 0).then_some(outcome.failed_uploads),
        };
        (response, message)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedDeletionResponse {
    pub public_id: String,
    pub error: String,
}

impl From<FailedDeletion> for FailedDeletionResponse {
    fn from(failed: FailedDeletion) -> Self {
        Self {
            public_id: failed.public_id,
            error: failed.error,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeletionResults {
    pub successful: Vec<String>,
    pub failed: Vec<FailedDeletionResponse>,
}

/// Delete response. Store results are only included when something failed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResourceResponse {
    pub deleted_resource_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deletion_results: Option<DeletionResults>,
}

impl DeleteResourceResponse {
    /// Build the response and its summary message.
    pub fn from_outcome(outcome: DeletionOutcome) -> (Self, String) {
        if outcome.is_clean() {
            return (
                Self {
                    deleted_resource_id: outcome.deleted_resource_id,
                    deletion_results: None,
                },
                "Resource deleted successfully".to_string(),
            );
        }

        let message = format!(
            "Resource deleted with {} file(s) failed to delete from storage",
            outcome.failed.len()
        );
        let response = Self {
            deleted_resource_id: outcome.deleted_resource_id,
            deletion_results: Some(DeletionResults {
                successful: outcome.successful,
                failed: outcome.failed.into_iter().map(Into::into).collect(),
            }),
        };
        (response, message)
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}
