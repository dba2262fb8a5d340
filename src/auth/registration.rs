//! User registration.

use thiserror::Error;
use tracing::info;

use crate::auth::{hash_password, PasswordError};
use crate::db::{NewUser, User, UserRepository};
use crate::{ClassHubError, DbPool};

/// Registration-specific errors.
#[derive(Error, Debug)]
pub enum RegistrationError {
    /// One of the required fields is empty or whitespace.
    #[error("all fields are required")]
    MissingFields,

    /// Email is already registered.
    #[error("user already exists")]
    EmailExists,

    /// Password rejected or hashing failed.
    #[error("password error: {0}")]
    Password(#[from] PasswordError),

    /// Database error.
    #[error("database error: {0}")]
    Database(String),
}

/// Registration request data.
#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    /// Display name.
    pub full_name: String,
    /// Login email.
    pub email: String,
    /// Plain-text password (8-128 characters).
    pub password: String,
}

impl RegistrationRequest {
    /// Create a new registration request.
    pub fn new(
        full_name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            full_name: full_name.into(),
            email: email.into(),
            password: password.into(),
        }
    }
}

/// A conflict here means a concurrent registration of the same email won.
fn creation_error(err: ClassHubError) -> RegistrationError {
    match err {
        ClassHubError::Conflict(_) => RegistrationError::EmailExists,
        other => RegistrationError::Database(other.to_string()),
    }
}

/// Register a new user.
///
/// Names and emails are stored trimmed. The email must not already exist
/// (case-insensitive).
pub async fn register(pool: &DbPool, request: &RegistrationRequest) -> Result<User, RegistrationError> {
    let full_name = request.full_name.trim();
    let email = request.email.trim();

    if [full_name, email, request.password.as_str()]
        .iter()
        .any(|field| field.trim().is_empty())
    {
        return Err(RegistrationError::MissingFields);
    }

    let repo = UserRepository::new(pool);
    if repo
        .email_exists(email)
        .await
        .map_err(|e| RegistrationError::Database(e.to_string()))?
    {
        return Err(RegistrationError::EmailExists);
    }

    let password_hash = hash_password(&request.password)?;

    let user = repo
        .create(&NewUser::new(full_name, email, password_hash))
        .await
        .map_err(creation_error)?;

    info!(user_id = user.id, "User registered");
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    #[tokio::test]
    async fn test_register_success() {
        let db = Database::open_in_memory().await.unwrap();

        let request = RegistrationRequest::new("  Ada Lovelace ", " ada@example.com", "password123");
        let user = register(db.pool(), &request).await.unwrap();

        assert_eq!(user.full_name, "Ada Lovelace");
        assert_eq!(user.email, "ada@example.com");
        assert!(user.password.starts_with("$argon2id$"));
        assert!(user.refresh_token.is_none());
    }

    #[tokio::test]
    async fn test_register_missing_fields() {
        let db = Database::open_in_memory().await.unwrap();

        for request in [
            RegistrationRequest::new("", "a@example.com", "password123"),
            RegistrationRequest::new("Ada", "   ", "password123"),
            RegistrationRequest::new("Ada", "a@example.com", "  "),
        ] {
            let result = register(db.pool(), &request).await;
            assert!(matches!(result, Err(RegistrationError::MissingFields)));
        }
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let db = Database::open_in_memory().await.unwrap();

        register(db.pool(), &RegistrationRequest::new("A", "a@example.com", "password123"))
            .await
            .unwrap();
        let result = register(
            db.pool(),
            &RegistrationRequest::new("B", "A@EXAMPLE.com", "password456"),
        )
        .await;

        assert!(matches!(result, Err(RegistrationError::EmailExists)));
    }

    #[tokio::test]
    async fn test_insert_conflict_maps_to_email_exists() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool());

        repo.create(&NewUser::new("A", "a@example.com", "hash"))
            .await
            .unwrap();
        let err = repo
            .create(&NewUser::new("B", "a@example.com", "hash"))
            .await
            .unwrap_err();

        assert!(matches!(creation_error(err), RegistrationError::EmailExists));
        assert!(matches!(
            creation_error(ClassHubError::Database("disk full".to_string())),
            RegistrationError::Database(_)
        ));
    }

    #[tokio::test]
    async fn test_register_short_password() {
        let db = Database::open_in_memory().await.unwrap();

        let result = register(db.pool(), &RegistrationRequest::new("A", "a@example.com", "short")).await;
        assert!(matches!(
            result,
            Err(RegistrationError::Password(PasswordError::TooShort))
        ));
    }
}
