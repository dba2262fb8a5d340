//! classhub - classroom resource sharing backend
//!
//! Users register and sign in with cookie sessions, group themselves into
//! classrooms and share files. Uploaded files go to a pluggable media store;
//! resource metadata lives in SQLite.

pub mod auth;
pub mod classroom;
pub mod config;
pub mod datetime;
pub mod db;
pub mod error;
pub mod logging;
pub mod resource;
pub mod storage;
pub mod web;

pub use auth::{
    authenticate, close_session, hash_password, open_session, register, validate_password,
    verify_password, AccessTokenVerifier, OpenSession, PasswordError, RegistrationError,
    RegistrationRequest, SessionError, TokenIssuer,
};
pub use classroom::{Classroom, ClassroomService, ClassroomUpdate};
pub use config::Config;
pub use db::{Database, DbPool, NewUser, User, UserRepository};
pub use error::{ClassHubError, Result};
pub use resource::{DeletionOutcome, Resource, ResourceService, UploadOutcome};
pub use storage::{public_id_from_url, MediaStore};
pub use web::WebServer;
