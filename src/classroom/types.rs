//! Classroom model.

/// A classroom that resources can be filed under.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Classroom {
    /// Unique classroom ID.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// University the classroom belongs to.
    pub university: String,
    /// Faculty within the university.
    pub faculty: String,
    /// Optional free-form description.
    pub description: Option<String>,
    /// User who created the classroom.
    pub owner_id: i64,
    /// Creation timestamp.
    pub created_at: String,
    /// Last modification timestamp.
    pub updated_at: String,
}

/// Data for creating a new classroom.
#[derive(Debug, Clone)]
pub struct NewClassroom {
    pub name: String,
    pub university: String,
    pub faculty: String,
    pub description: Option<String>,
    pub owner_id: i64,
}

impl NewClassroom {
    /// Create a new classroom record owned by `owner_id`.
    pub fn new(
        owner_id: i64,
        name: impl Into<String>,
        university: impl Into<String>,
        faculty: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            university: university.into(),
            faculty: faculty.into(),
            description: None,
            owner_id,
        }
    }

    /// Attach a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Partial update of a classroom. Unset fields are left alone.
#[derive(Debug, Clone, Default)]
pub struct ClassroomUpdate {
    pub name: Option<String>,
    pub university: Option<String>,
    pub faculty: Option<String>,
    /// `Some(None)` clears the description.
    pub description: Option<Option<String>>,
}

impl ClassroomUpdate {
    /// Whether no field is set.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.university.is_none()
            && self.faculty.is_none()
            && self.description.is_none()
    }
}
