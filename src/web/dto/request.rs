//! Request DTOs for Web API.

use serde::Deserialize;
use validator::Validate;

use super::validation::not_empty_trimmed;
use crate::classroom::ClassroomUpdate;

/// User registration request.
///
/// Absent fields deserialize as empty strings so they are reported as
/// missing rather than as malformed JSON.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(custom(function = "not_empty_trimmed", message = "Full name is required"))]
    pub full_name: String,
    #[serde(default)]
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(
        min = 8,
        max = 128,
        message = "Password must be 8-128 characters"
    ))]
    pub password: String,
}

/// Login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Classroom creation request.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateClassroomRequest {
    #[serde(default)]
    #[validate(custom(function = "not_empty_trimmed", message = "Name is required"))]
    pub name: String,
    #[serde(default)]
    #[validate(custom(function = "not_empty_trimmed", message = "University is required"))]
    pub university: String,
    #[serde(default)]
    #[validate(custom(function = "not_empty_trimmed", message = "Faculty is required"))]
    pub faculty: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Classroom update request. Omitted fields are left unchanged.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateClassroomRequest {
    pub name: Option<String>,
    pub university: Option<String>,
    pub faculty: Option<String>,
    /// `null` clears the description.
    #[serde(default, deserialize_with = "deserialize_some")]
    pub description: Option<Option<String>>,
}

fn deserialize_some<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl From<UpdateClassroomRequest> for ClassroomUpdate {
    fn from(req: UpdateClassroomRequest) -> Self {
        ClassroomUpdate {
            name: req.name,
            university: req.university,
            faculty: req.faculty,
            description: req.description,
        }
    }
}

/// Query parameters for classroom search.
#[derive(Debug, Deserialize)]
pub struct ClassroomSearchQuery {
    #[serde(default)]
    pub university: String,
    #[serde(default)]
    pub faculty: String,
}

/// Resource search request body.
#[derive(Debug, Deserialize, Validate)]
pub struct ResourceSearchRequest {
    #[serde(default)]
    pub title: String,
}
