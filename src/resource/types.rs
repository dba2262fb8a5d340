//! Resource model.

/// A shared resource: a titled note with one or more stored files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub id: i64,
    /// Uploading user; the only one allowed to delete it.
    pub owner_id: i64,
    /// Classroom the resource is filed under, if any.
    pub classroom_id: Option<i64>,
    pub title: String,
    pub text: String,
    /// Public URLs of the stored files, in upload order. Never empty.
    pub urls: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ResourceRow {
    pub id: i64,
    pub owner_id: i64,
    pub classroom_id: Option<i64>,
    pub title: String,
    pub text: String,
    pub created_at: String,
    pub updated_at: String,
}

impl ResourceRow {
    pub(crate) fn into_resource(self, urls: Vec<String>) -> Resource {
        Resource {
            id: self.id,
            owner_id: self.owner_id,
            classroom_id: self.classroom_id,
            title: self.title,
            text: self.text,
            urls,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Data for inserting a resource record.
#[derive(Debug, Clone)]
pub struct NewResource {
    pub owner_id: i64,
    pub classroom_id: Option<i64>,
    pub title: String,
    pub text: String,
    pub urls: Vec<String>,
}

impl NewResource {
    pub fn new(owner_id: i64, title: impl Into<String>, urls: Vec<String>) -> Self {
        Self {
            owner_id,
            classroom_id: None,
            title: title.into(),
            text: String::new(),
            urls,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn in_classroom(mut self, classroom_id: Option<i64>) -> Self {
        self.classroom_id = classroom_id;
        self
    }
}
