//! API handlers.

pub mod classroom;
pub mod resource;
pub mod user;

pub use classroom::*;
pub use resource::*;
pub use user::*;

use std::path::PathBuf;
use std::sync::Arc;

use crate::auth::TokenIssuer;
use crate::config::Config;
use crate::storage::MediaStore;
use crate::{Database, DbPool};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub tokens: TokenIssuer,
    pub media_store: Arc<dyn MediaStore>,
    /// Where multipart uploads are spooled before going to the store.
    pub upload_temp_dir: PathBuf,
    /// Maximum size of a single uploaded file in bytes.
    pub max_file_size: usize,
    /// Lifetime of the session cookies in days.
    pub cookie_expiry_days: i64,
}

impl AppState {
    /// Create the application state from configuration.
    pub fn new(db: Arc<Database>, config: &Config, media_store: Arc<dyn MediaStore>) -> Self {
        Self {
            db,
            tokens: TokenIssuer::from_config(&config.auth),
            media_store,
            upload_temp_dir: PathBuf::from(&config.uploads.temp_dir),
            max_file_size: (config.uploads.max_file_size_mb as usize).saturating_mul(1024 * 1024),
            cookie_expiry_days: config.auth.cookie_expiry_days,
        }
    }

    /// The database pool.
    pub fn pool(&self) -> &DbPool {
        self.db.pool()
    }
}
