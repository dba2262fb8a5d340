//! User repository for classhub.

use super::user::{NewUser, User};
use super::DbPool;
use crate::{ClassHubError, Result};

const USER_COLUMNS: &str = "id, full_name, email, password, refresh_token, otp, otp_expiry,
                            created_at, updated_at";

/// Repository for user operations.
pub struct UserRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository with the given pool.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Insert a new user and return it with its assigned ID.
    ///
    /// A duplicate email (case-insensitive) is `ClassHubError::Conflict`.
    pub async fn create(&self, new_user: &NewUser) -> Result<User> {
        let result = sqlx::query("INSERT INTO users (full_name, email, password) VALUES (?, ?, ?)")
            .bind(&new_user.full_name)
            .bind(&new_user.email)
            .bind(&new_user.password)
            .execute(self.pool)
            .await
            .map_err(|e| {
                let duplicate = e
                    .as_database_error()
                    .is_some_and(|db| db.is_unique_violation());
                if duplicate {
                    ClassHubError::Conflict(format!("email {} already registered", new_user.email))
                } else {
                    e.into()
                }
            })?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| ClassHubError::NotFound("user".to_string()))
    }

    /// Get a user by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(user)
    }

    /// Get a user by email (case-insensitive).
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ? COLLATE NOCASE");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email.trim())
            .fetch_optional(self.pool)
            .await?;
        Ok(user)
    }

    /// Check whether an email is already registered (case-insensitive).
    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = ? COLLATE NOCASE)")
                .bind(email.trim())
                .fetch_one(self.pool)
                .await?;
        Ok(exists)
    }

    /// Store (or clear, with `None`) the user's refresh token.
    ///
    /// Touches only the token column. Returns false if the user does not exist.
    pub async fn set_refresh_token(&self, id: i64, token: Option<&str>) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE users SET refresh_token = ?, updated_at = datetime('now') WHERE id = ?",
        )
        .bind(token)
        .bind(id)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count all users.
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
