//! Resource repository.
//!
//! A resource row and its file URL rows are written in one transaction.
//! Title/text search goes through the `resources_fts` FTS5 index.

use super::types::{NewResource, Resource, ResourceRow};
use crate::db::DbPool;
use crate::{ClassHubError, Result};

const RESOURCE_COLUMNS: &str =
    "r.id, r.owner_id, r.classroom_id, r.title, r.text, r.created_at, r.updated_at";

/// Turn free text into an FTS5 query where any term may match.
///
/// Each whitespace-separated term is quoted so FTS5 operators in user input
/// are matched literally. Returns `None` when there are no terms.
pub fn fts_query(input: &str) -> Option<String> {
    let terms: Vec<String> = input
        .split_whitespace()
        .map(|term| term.replace('"', ""))
        .filter(|term| !term.is_empty())
        .map(|term| format!("\"{term}\""))
        .collect();

    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" OR "))
    }
}

/// Repository for resource records.
pub struct ResourceRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> ResourceRepository<'a> {
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Insert a resource with its URLs.
    ///
    /// Fails with a validation error if `urls` is empty.
    pub async fn create(&self, new_resource: &NewResource) -> Result<Resource> {
        if new_resource.urls.is_empty() {
            return Err(ClassHubError::Validation(
                "a resource needs at least one file".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO resources (owner_id, classroom_id, title, text)
             VALUES (?, ?, ?, ?) RETURNING id",
        )
        .bind(new_resource.owner_id)
        .bind(new_resource.classroom_id)
        .bind(&new_resource.title)
        .bind(&new_resource.text)
        .fetch_one(&mut *tx)
        .await?;

        for (position, url) in new_resource.urls.iter().enumerate() {
            sqlx::query("INSERT INTO resource_files (resource_id, position, url) VALUES (?, ?, ?)")
                .bind(id)
                .bind(position as i64)
                .bind(url)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| ClassHubError::NotFound("resource".to_string()))
    }

    async fn urls_for(&self, resource_id: i64) -> Result<Vec<String>> {
        let urls: Vec<String> = sqlx::query_scalar(
            "SELECT url FROM resource_files WHERE resource_id = ? ORDER BY position",
        )
        .bind(resource_id)
        .fetch_all(self.pool)
        .await?;
        Ok(urls)
    }

    async fn hydrate(&self, rows: Vec<ResourceRow>) -> Result<Vec<Resource>> {
        let mut resources = Vec::with_capacity(rows.len());
        for row in rows {
            let urls = self.urls_for(row.id).await?;
            resources.push(row.into_resource(urls));
        }
        Ok(resources)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Resource>> {
        let sql = format!("SELECT {RESOURCE_COLUMNS} FROM resources r WHERE r.id = ?");
        let row = sqlx::query_as::<_, ResourceRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        match row {
            Some(row) => {
                let urls = self.urls_for(row.id).await?;
                Ok(Some(row.into_resource(urls)))
            }
            None => Ok(None),
        }
    }

    /// Full-text search over title and text, best match first.
    pub async fn search(&self, query: &str) -> Result<Vec<Resource>> {
        let Some(expr) = fts_query(query) else {
            return Ok(Vec::new());
        };

        let sql = format!(
            "SELECT {RESOURCE_COLUMNS} FROM resources_fts
             JOIN resources r ON r.id = resources_fts.rowid
             WHERE resources_fts MATCH ?
             ORDER BY rank"
        );
        let rows = sqlx::query_as::<_, ResourceRow>(&sql)
            .bind(expr)
            .fetch_all(self.pool)
            .await?;

        self.hydrate(rows).await
    }

    /// Resources uploaded by a user, newest first.
    pub async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<Resource>> {
        let sql = format!(
            "SELECT {RESOURCE_COLUMNS} FROM resources r
             WHERE r.owner_id = ?
             ORDER BY r.created_at DESC, r.id DESC"
        );
        let rows = sqlx::query_as::<_, ResourceRow>(&sql)
            .bind(owner_id)
            .fetch_all(self.pool)
            .await?;

        self.hydrate(rows).await
    }

    /// Delete a resource and its URL rows. Returns false if it did not exist.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM resources WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM resources")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classroom::{ClassroomRepository, NewClassroom};
    use crate::db::{NewUser, UserRepository};
    use crate::Database;

    async fn setup() -> (Database, i64) {
        let db = Database::open_in_memory().await.unwrap();
        let user = UserRepository::new(db.pool())
            .create(&NewUser::new("Owner", "owner@example.com", "pw"))
            .await
            .unwrap();
        (db, user.id)
    }

    fn urls(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("https://cdn.test/f{i}.pdf")).collect()
    }

    #[test]
    fn test_fts_query() {
        assert_eq!(fts_query("linear algebra").as_deref(), Some("\"linear\" OR \"algebra\""));
        assert_eq!(fts_query("say \"hi\" NOT").as_deref(), Some("\"say\" OR \"hi\" OR \"NOT\""));
        assert_eq!(fts_query("   "), None);
        assert_eq!(fts_query("\"\""), None);
    }

    #[tokio::test]
    async fn test_create_keeps_url_order() {
        let (db, owner) = setup().await;
        let repo = ResourceRepository::new(db.pool());

        let created = repo
            .create(&NewResource::new(owner, "Notes", urls(3)).with_text("week 1"))
            .await
            .unwrap();

        assert_eq!(created.urls, urls(3));
        assert_eq!(created.text, "week 1");
        assert!(created.classroom_id.is_none());
    }

    #[tokio::test]
    async fn test_create_rejects_empty_urls() {
        let (db, owner) = setup().await;
        let repo = ResourceRepository::new(db.pool());

        let result = repo.create(&NewResource::new(owner, "Notes", vec![])).await;
        assert!(matches!(result, Err(ClassHubError::Validation(_))));
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_search_matches_any_term() {
        let (db, owner) = setup().await;
        let repo = ResourceRepository::new(db.pool());

        repo.create(&NewResource::new(owner, "Linear algebra notes", urls(1)))
            .await
            .unwrap();
        repo.create(&NewResource::new(owner, "Organic chemistry", urls(1)).with_text("lab algebra"))
            .await
            .unwrap();
        repo.create(&NewResource::new(owner, "History essay", urls(1)))
            .await
            .unwrap();

        let found = repo.search("algebra").await.unwrap();
        assert_eq!(found.len(), 2);

        let found = repo.search("history chemistry").await.unwrap();
        assert_eq!(found.len(), 2);

        assert!(repo.search("physics").await.unwrap().is_empty());
        assert!(repo.search("  ").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_removes_index_entry() {
        let (db, owner) = setup().await;
        let repo = ResourceRepository::new(db.pool());
        let created = repo
            .create(&NewResource::new(owner, "Calculus", urls(2)))
            .await
            .unwrap();

        assert!(repo.delete(created.id).await.unwrap());
        assert!(!repo.delete(created.id).await.unwrap());
        assert!(repo.search("calculus").await.unwrap().is_empty());

        let orphans: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM resource_files")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(orphans, 0);
    }

    #[tokio::test]
    async fn test_list_by_owner_newest_first() {
        let (db, owner) = setup().await;
        let repo = ResourceRepository::new(db.pool());

        let first = repo.create(&NewResource::new(owner, "First", urls(1))).await.unwrap();
        let second = repo.create(&NewResource::new(owner, "Second", urls(1))).await.unwrap();

        let listed = repo.list_by_owner(owner).await.unwrap();
        assert_eq!(
            listed.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![second.id, first.id]
        );
        assert!(repo.list_by_owner(owner + 100).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_classroom_delete_detaches_resources() {
        let (db, owner) = setup().await;
        let classroom = ClassroomRepository::new(db.pool())
            .create(&NewClassroom::new(owner, "A", "MIT", "EECS"))
            .await
            .unwrap();
        let repo = ResourceRepository::new(db.pool());
        let created = repo
            .create(&NewResource::new(owner, "Notes", urls(1)).in_classroom(Some(classroom.id)))
            .await
            .unwrap();
        assert_eq!(created.classroom_id, Some(classroom.id));

        ClassroomRepository::new(db.pool()).delete(classroom.id).await.unwrap();

        let reloaded = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert!(reloaded.classroom_id.is_none());
    }
}
