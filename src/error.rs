//! Error types for classhub.

use thiserror::Error;

/// Common error type for classhub.
#[derive(Error, Debug)]
pub enum ClassHubError {
    /// Database error.
    ///
    /// Errors from sqlx are converted into this variant.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Authentication error (missing or bad credentials, bad token).
    #[error("authentication error: {0}")]
    Auth(String),

    /// The caller is authenticated but not allowed to touch the record.
    #[error("permission denied: {0}")]
    Permission(String),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// A uniqueness constraint was violated (e.g. an email already registered).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Record not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Media store error (upload or delete failed remotely).
    #[error("storage error: {0}")]
    Storage(String),

    /// Token could not be minted or decoded.
    #[error("token error: {0}")]
    Token(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for ClassHubError {
    fn from(e: sqlx::Error) -> Self {
        ClassHubError::Database(e.to_string())
    }
}

/// Result type alias for classhub operations.
pub type Result<T> = std::result::Result<T, ClassHubError>;
