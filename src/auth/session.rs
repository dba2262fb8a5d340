//! Login and logout.
//!
//! A session is the pair of tokens minted at login plus the refresh token
//! persisted on the user row. Logout clears the persisted token.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::auth::{verify_password, PasswordError, TokenIssuer, TokenPair};
use crate::db::{User, UserRepository};
use crate::DbPool;

/// Session-related errors.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Email or password was missing from the request.
    #[error("email and password are required")]
    MissingCredentials,

    /// No user is registered under the email.
    #[error("user not found")]
    UserNotFound,

    /// Wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Token minting or persistence failed.
    #[error("error while generating tokens: {0}")]
    TokenGeneration(String),

    /// Database error.
    #[error("database error: {0}")]
    Database(String),
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct OpenSession {
    /// The authenticated user, with the new refresh token stored.
    pub user: User,
    /// The minted tokens.
    pub tokens: TokenPair,
}

/// Check credentials without opening a session.
pub async fn authenticate(pool: &DbPool, email: &str, password: &str) -> Result<User, SessionError> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(SessionError::MissingCredentials);
    }

    let user = UserRepository::new(pool)
        .get_by_email(email)
        .await
        .map_err(|e| SessionError::Database(e.to_string()))?
        .ok_or(SessionError::UserNotFound)?;

    match verify_password(password, &user.password) {
        Ok(()) => Ok(user),
        Err(PasswordError::VerificationFailed) => {
            debug!(user_id = user.id, "Password mismatch");
            Err(SessionError::InvalidCredentials)
        }
        Err(e) => {
            warn!(user_id = user.id, error = %e, "Stored password hash is unusable");
            Err(SessionError::InvalidCredentials)
        }
    }
}

/// Mint a token pair for an already-authenticated user and persist the
/// refresh token.
pub async fn issue_session(
    pool: &DbPool,
    issuer: &TokenIssuer,
    mut user: User,
) -> Result<OpenSession, SessionError> {
    let tokens = issuer
        .issue_pair(&user)
        .map_err(|e| SessionError::TokenGeneration(e.to_string()))?;

    let stored = UserRepository::new(pool)
        .set_refresh_token(user.id, Some(&tokens.refresh_token))
        .await
        .map_err(|e| SessionError::TokenGeneration(e.to_string()))?;
    if !stored {
        return Err(SessionError::TokenGeneration("user vanished".to_string()));
    }
    user.refresh_token = Some(tokens.refresh_token.clone());

    Ok(OpenSession { user, tokens })
}

/// Authenticate and mint a token pair, persisting the refresh token.
pub async fn open_session(
    pool: &DbPool,
    issuer: &TokenIssuer,
    email: &str,
    password: &str,
) -> Result<OpenSession, SessionError> {
    let user = authenticate(pool, email, password).await?;
    let session = issue_session(pool, issuer, user).await?;

    info!(user_id = session.user.id, "User logged in");
    Ok(session)
}

/// Clear the persisted refresh token.
///
/// Idempotent: closing a session that is already closed succeeds.
pub async fn close_session(pool: &DbPool, user_id: i64) -> Result<(), SessionError> {
    UserRepository::new(pool)
        .set_refresh_token(user_id, None)
        .await
        .map_err(|e| SessionError::Database(e.to_string()))?;

    info!(user_id, "User logged out");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{register, RegistrationRequest};
    use crate::Database;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new("access", 900, "refresh", 10)
    }

    async fn setup() -> Database {
        let db = Database::open_in_memory().await.unwrap();
        register(
            db.pool(),
            &RegistrationRequest::new("Ada", "ada@example.com", "password123"),
        )
        .await
        .unwrap();
        db
    }

    #[tokio::test]
    async fn test_open_session_persists_refresh_token() {
        let db = setup().await;

        let session = open_session(db.pool(), &issuer(), "ADA@example.com", "password123")
            .await
            .unwrap();

        let stored = UserRepository::new(db.pool())
            .get_by_id(session.user.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.refresh_token.as_deref(), Some(session.tokens.refresh_token.as_str()));
        assert!(!session.tokens.access_token.is_empty());
    }

    #[tokio::test]
    async fn test_wrong_password_leaves_no_token() {
        let db = setup().await;

        let result = open_session(db.pool(), &issuer(), "ada@example.com", "wrongpass").await;
        assert!(matches!(result, Err(SessionError::InvalidCredentials)));

        let stored = UserRepository::new(db.pool())
            .get_by_email("ada@example.com")
            .await
            .unwrap()
            .unwrap();
        assert!(stored.refresh_token.is_none());
    }

    #[tokio::test]
    async fn test_unknown_email() {
        let db = setup().await;
        let result = authenticate(db.pool(), "nobody@example.com", "password123").await;
        assert!(matches!(result, Err(SessionError::UserNotFound)));
    }

    #[tokio::test]
    async fn test_missing_credentials() {
        let db = setup().await;
        assert!(matches!(
            authenticate(db.pool(), "  ", "password123").await,
            Err(SessionError::MissingCredentials)
        ));
        assert!(matches!(
            authenticate(db.pool(), "ada@example.com", "").await,
            Err(SessionError::MissingCredentials)
        ));
    }

    #[tokio::test]
    async fn test_issue_session_for_unknown_user() {
        let db = setup().await;
        let mut user = authenticate(db.pool(), "ada@example.com", "password123")
            .await
            .unwrap();
        user.id = 999;

        let result = issue_session(db.pool(), &issuer(), user).await;
        assert!(matches!(result, Err(SessionError::TokenGeneration(_))));
    }

    #[tokio::test]
    async fn test_close_session_is_idempotent() {
        let db = setup().await;
        let session = open_session(db.pool(), &issuer(), "ada@example.com", "password123")
            .await
            .unwrap();

        close_session(db.pool(), session.user.id).await.unwrap();
        close_session(db.pool(), session.user.id).await.unwrap();

        let stored = UserRepository::new(db.pool())
            .get_by_id(session.user.id)
            .await
            .unwrap()
            .unwrap();
        assert!(!stored.has_session());
    }
}
