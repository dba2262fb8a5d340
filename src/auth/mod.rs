//! Authentication for classhub.
//!
//! Password hashing, token minting, user registration and login sessions.

mod password;
mod registration;
mod session;
mod token;

pub use password::{
    hash_password, validate_password, verify_password, PasswordError, MAX_PASSWORD_LENGTH,
    MIN_PASSWORD_LENGTH,
};
pub use registration::{register, RegistrationError, RegistrationRequest};
pub use session::{
    authenticate, close_session, issue_session, open_session, OpenSession, SessionError,
};
pub use token::{AccessClaims, AccessTokenVerifier, RefreshClaims, TokenIssuer, TokenPair};
