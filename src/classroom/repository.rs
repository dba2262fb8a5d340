//! Classroom repository.

use sqlx::QueryBuilder;

use super::types::{Classroom, ClassroomUpdate, NewClassroom};
use crate::db::DbPool;
use crate::{ClassHubError, Result};

const CLASSROOM_COLUMNS: &str =
    "id, name, university, faculty, description, owner_id, created_at, updated_at";

/// Repository for classroom CRUD operations.
pub struct ClassroomRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> ClassroomRepository<'a> {
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Insert a classroom and return it with its assigned ID.
    pub async fn create(&self, new_classroom: &NewClassroom) -> Result<Classroom> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO classrooms (name, university, faculty, description, owner_id)
             VALUES (?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(&new_classroom.name)
        .bind(&new_classroom.university)
        .bind(&new_classroom.faculty)
        .bind(&new_classroom.description)
        .bind(new_classroom.owner_id)
        .fetch_one(self.pool)
        .await?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| ClassHubError::NotFound("classroom".to_string()))
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Classroom>> {
        let sql = format!("SELECT {CLASSROOM_COLUMNS} FROM classrooms WHERE id = ?");
        let classroom = sqlx::query_as::<_, Classroom>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(classroom)
    }

    pub async fn exists(&self, id: i64) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM classrooms WHERE id = ?)")
            .bind(id)
            .fetch_one(self.pool)
            .await?;
        Ok(exists)
    }

    /// List every classroom, oldest first.
    pub async fn list_all(&self) -> Result<Vec<Classroom>> {
        let sql = format!("SELECT {CLASSROOM_COLUMNS} FROM classrooms ORDER BY id");
        let classrooms = sqlx::query_as::<_, Classroom>(&sql)
            .fetch_all(self.pool)
            .await?;
        Ok(classrooms)
    }

    /// Find classrooms by university and faculty (case-insensitive, trimmed).
    pub async fn find_by_university_and_faculty(
        &self,
        university: &str,
        faculty: &str,
    ) -> Result<Vec<Classroom>> {
        let sql = format!(
            "SELECT {CLASSROOM_COLUMNS} FROM classrooms
             WHERE university = ? COLLATE NOCASE AND faculty = ? COLLATE NOCASE
             ORDER BY id"
        );
        let classrooms = sqlx::query_as::<_, Classroom>(&sql)
            .bind(university.trim())
            .bind(faculty.trim())
            .fetch_all(self.pool)
            .await?;
        Ok(classrooms)
    }

    /// Apply a partial update. Returns `None` if the classroom does not exist.
    pub async fn update(&self, id: i64, update: &ClassroomUpdate) -> Result<Option<Classroom>> {
        if update.is_empty() {
            return self.get_by_id(id).await;
        }

        let mut query: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new("UPDATE classrooms SET ");
        let mut separated = query.separated(", ");

        if let Some(ref name) = update.name {
            separated.push("name = ");
            separated.push_bind_unseparated(name.clone());
        }
        if let Some(ref university) = update.university {
            separated.push("university = ");
            separated.push_bind_unseparated(university.clone());
        }
        if let Some(ref faculty) = update.faculty {
            separated.push("faculty = ");
            separated.push_bind_unseparated(faculty.clone());
        }
        if let Some(ref description) = update.description {
            separated.push("description = ");
            separated.push_bind_unseparated(description.clone());
        }
        separated.push("updated_at = datetime('now')");

        query.push(" WHERE id = ");
        query.push_bind(id);

        let result = query.build().execute(self.pool).await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_by_id(id).await
    }

    /// Delete a classroom. Returns false if it did not exist.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM classrooms WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
