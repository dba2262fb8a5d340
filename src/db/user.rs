//! User model for classhub.

/// A registered user.
///
/// Carries credential material (`password`, `refresh_token`, `otp`), so it
/// is never serialized directly; the web layer maps it to a sanitized DTO.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Unique user ID.
    pub id: i64,
    /// Display name.
    pub full_name: String,
    /// Login email (unique, case-insensitive).
    pub email: String,
    /// Password hash (Argon2).
    pub password: String,
    /// Refresh token issued at the last login, if the session is open.
    pub refresh_token: Option<String>,
    /// Pending one-time password.
    pub otp: Option<String>,
    /// Expiry of the pending one-time password.
    pub otp_expiry: Option<String>,
    /// Account creation timestamp.
    pub created_at: String,
    /// Last modification timestamp.
    pub updated_at: String,
}

impl User {
    /// Whether the user currently holds a persisted refresh token.
    pub fn has_session(&self) -> bool {
        self.refresh_token.is_some()
    }
}

/// Data for creating a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Display name.
    pub full_name: String,
    /// Login email.
    pub email: String,
    /// Password hash (must already be hashed).
    pub password: String,
}

impl NewUser {
    /// Create a new user record.
    pub fn new(
        full_name: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            full_name: full_name.into(),
            email: email.into(),
            password: password_hash.into(),
        }
    }
}
