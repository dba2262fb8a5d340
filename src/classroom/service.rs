//! Classroom operations with ownership checks.

use tracing::info;

use super::repository::ClassroomRepository;
use super::types::{Classroom, ClassroomUpdate, NewClassroom};
use crate::db::DbPool;
use crate::{ClassHubError, Result};

fn required(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ClassHubError::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Classroom service.
pub struct ClassroomService<'a> {
    pool: &'a DbPool,
}

impl<'a> ClassroomService<'a> {
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    fn repo(&self) -> ClassroomRepository<'a> {
        ClassroomRepository::new(self.pool)
    }

    /// Create a classroom owned by `owner_id`.
    ///
    /// Name, university and faculty are required and stored trimmed.
    pub async fn create(
        &self,
        owner_id: i64,
        name: &str,
        university: &str,
        faculty: &str,
        description: Option<String>,
    ) -> Result<Classroom> {
        let mut new_classroom = NewClassroom::new(
            owner_id,
            required("name", name)?,
            required("university", university)?,
            required("faculty", faculty)?,
        );
        new_classroom.description = optional_text(description);

        let classroom = self.repo().create(&new_classroom).await?;
        info!(classroom_id = classroom.id, owner_id, "Classroom created");
        Ok(classroom)
    }

    pub async fn list(&self) -> Result<Vec<Classroom>> {
        self.repo().list_all().await
    }

    /// Find classrooms by university and faculty.
    ///
    /// Both terms are required; an empty result is `NotFound`.
    pub async fn search(&self, university: &str, faculty: &str) -> Result<Vec<Classroom>> {
        let university = required("university", university)?;
        let faculty = required("faculty", faculty)?;

        let found = self
            .repo()
            .find_by_university_and_faculty(&university, &faculty)
            .await?;
        if found.is_empty() {
            return Err(ClassHubError::NotFound("classroom".to_string()));
        }
        Ok(found)
    }

    async fn owned(&self, requester_id: i64, id: i64, action: &str) -> Result<Classroom> {
        let classroom = self
            .repo()
            .get_by_id(id)
            .await?
            .ok_or_else(|| ClassHubError::NotFound("classroom".to_string()))?;

        if classroom.owner_id != requester_id {
            return Err(ClassHubError::Permission(format!(
                "only the creator can {action} this classroom"
            )));
        }
        Ok(classroom)
    }

    /// Update a classroom. Only its creator may do so.
    pub async fn update(
        &self,
        requester_id: i64,
        id: i64,
        mut update: ClassroomUpdate,
    ) -> Result<Classroom> {
        self.owned(requester_id, id, "update").await?;

        if let Some(ref name) = update.name {
            update.name = Some(required("name", name)?);
        }
        if let Some(ref university) = update.university {
            update.university = Some(required("university", university)?);
        }
        if let Some(ref faculty) = update.faculty {
            update.faculty = Some(required("faculty", faculty)?);
        }
        if let Some(description) = update.description.take() {
            update.description = Some(optional_text(description));
        }

        let classroom = self
            .repo()
            .update(id, &update)
            .await?
            .ok_or_else(|| ClassHubError::NotFound("classroom".to_string()))?;

        info!(classroom_id = id, "Classroom updated");
        Ok(classroom)
    }

    /// Delete a classroom. Only its creator may do so.
    ///
    /// Resources filed under it keep existing with no classroom.
    pub async fn delete(&self, requester_id: i64, id: i64) -> Result<Classroom> {
        let classroom = self.owned(requester_id, id, "delete").await?;

        if !self.repo().delete(id).await? {
            return Err(ClassHubError::NotFound("classroom".to_string()));
        }

        info!(classroom_id = id, "Classroom deleted");
        Ok(classroom)
    }
}
