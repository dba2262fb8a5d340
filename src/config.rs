//! Configuration module for classhub.

use serde::Deserialize;
use std::path::Path;

use crate::{ClassHubError, Result};

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origins. Empty means permissive (development) mode.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Rate limit for login/register (requests per minute per client).
    #[serde(default = "default_login_rate_limit")]
    pub login_rate_limit: u32,
    /// Take client IPs from `X-Forwarded-For` / `X-Real-IP` (only behind a trusted proxy).
    #[serde(default)]
    pub trust_proxy_headers: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_login_rate_limit() -> u32 {
    10
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![],
            login_rate_limit: default_login_rate_limit(),
            trust_proxy_headers: false,
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/classhub.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Session token configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Secret used to sign access tokens.
    #[serde(default)]
    pub access_token_secret: String,
    /// Access token lifetime in seconds.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
    /// Secret used to sign refresh tokens.
    #[serde(default)]
    pub refresh_token_secret: String,
    /// Refresh token lifetime in days.
    #[serde(default = "default_refresh_token_expiry")]
    pub refresh_token_expiry_days: u64,
    /// Lifetime of the session cookies in days.
    #[serde(default = "default_cookie_expiry")]
    pub cookie_expiry_days: i64,
}

fn default_access_token_expiry() -> u64 {
    86_400 // 1 day
}

fn default_refresh_token_expiry() -> u64 {
    10
}

fn default_cookie_expiry() -> i64 {
    7
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_token_secret: String::new(),
            access_token_expiry_secs: default_access_token_expiry(),
            refresh_token_secret: String::new(),
            refresh_token_expiry_days: default_refresh_token_expiry(),
            cookie_expiry_days: default_cookie_expiry(),
        }
    }
}

/// Upload intake configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadsConfig {
    /// Directory where incoming multipart files are spooled before upload.
    #[serde(default = "default_temp_dir")]
    pub temp_dir: String,
    /// Maximum size of a single file in megabytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size_mb: u64,
}

fn default_temp_dir() -> String {
    "public/temp".to_string()
}

fn default_max_file_size() -> u64 {
    10
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            temp_dir: default_temp_dir(),
            max_file_size_mb: default_max_file_size(),
        }
    }
}

/// Which media store backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Files kept on the local filesystem.
    #[default]
    Local,
    /// Cloudinary upload API.
    Cloudinary,
}

/// Local filesystem store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LocalStorageConfig {
    /// Directory that holds stored objects.
    #[serde(default = "default_local_path")]
    pub path: String,
    /// Base URL under which stored objects are served.
    #[serde(default = "default_local_base_url")]
    pub public_base_url: String,
}

fn default_local_path() -> String {
    "data/media".to_string()
}

fn default_local_base_url() -> String {
    "http://localhost:8000/media".to_string()
}

impl Default for LocalStorageConfig {
    fn default() -> Self {
        Self {
            path: default_local_path(),
            public_base_url: default_local_base_url(),
        }
    }
}

/// Cloudinary store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CloudinaryConfig {
    /// Cloud name (account identifier).
    #[serde(default)]
    pub cloud_name: String,
    /// API key.
    #[serde(default)]
    pub api_key: String,
    /// API secret used for request signatures.
    #[serde(default)]
    pub api_secret: String,
    /// Resource type for destroy calls when the asset URL does not name one
    /// (image, video, raw).
    #[serde(default = "default_cloudinary_resource_type")]
    pub delete_resource_type: String,
    /// Request timeout in seconds.
    #[serde(default = "default_cloudinary_timeout")]
    pub timeout_secs: u64,
    /// API base URL.
    #[serde(default = "default_cloudinary_api_base")]
    pub api_base: String,
}

fn default_cloudinary_resource_type() -> String {
    "image".to_string()
}

fn default_cloudinary_timeout() -> u64 {
    60
}

fn default_cloudinary_api_base() -> String {
    "https://api.cloudinary.com/v1_1".to_string()
}

impl Default for CloudinaryConfig {
    fn default() -> Self {
        Self {
            cloud_name: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            delete_resource_type: default_cloudinary_resource_type(),
            timeout_secs: default_cloudinary_timeout(),
            api_base: default_cloudinary_api_base(),
        }
    }
}

/// Media store configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct StorageConfig {
    /// Selected backend.
    #[serde(default)]
    pub backend: StorageBackend,
    /// Local backend settings.
    #[serde(default)]
    pub local: LocalStorageConfig,
    /// Cloudinary backend settings.
    #[serde(default)]
    pub cloudinary: CloudinaryConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/classhub.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Session token configuration.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Upload intake configuration.
    #[serde(default)]
    pub uploads: UploadsConfig,
    /// Media store configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ClassHubError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| ClassHubError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `CLASSHUB_ACCESS_TOKEN_SECRET`
    /// - `CLASSHUB_REFRESH_TOKEN_SECRET`
    /// - `CLASSHUB_CLOUDINARY_API_SECRET`
    ///
    /// Empty values are ignored.
    pub fn apply_env_overrides(&mut self) {
        fn non_empty(name: &str) -> Option<String> {
            std::env::var(name).ok().filter(|v| !v.is_empty())
        }

        if let Some(secret) = non_empty("CLASSHUB_ACCESS_TOKEN_SECRET") {
            self.auth.access_token_secret = secret;
        }
        if let Some(secret) = non_empty("CLASSHUB_REFRESH_TOKEN_SECRET") {
            self.auth.refresh_token_secret = secret;
        }
        if let Some(secret) = non_empty("CLASSHUB_CLOUDINARY_API_SECRET") {
            self.storage.cloudinary.api_secret = secret;
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - either token secret is empty
    /// - the Cloudinary backend is selected without credentials
    pub fn validate(&self) -> Result<()> {
        if self.auth.access_token_secret.is_empty() || self.auth.refresh_token_secret.is_empty() {
            return Err(ClassHubError::Config(
                "access_token_secret and refresh_token_secret must be set in config.toml \
                 or via CLASSHUB_ACCESS_TOKEN_SECRET / CLASSHUB_REFRESH_TOKEN_SECRET"
                    .to_string(),
            ));
        }

        if self.storage.backend == StorageBackend::Cloudinary {
            let c = &self.storage.cloudinary;
            if c.cloud_name.is_empty() || c.api_key.is_empty() || c.api_secret.is_empty() {
                return Err(ClassHubError::Config(
                    "storage.cloudinary requires cloud_name, api_key and api_secret".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8000);
        assert!(config.server.cors_origins.is_empty());
        assert_eq!(config.server.login_rate_limit, 10);
        assert!(!config.server.trust_proxy_headers);

        assert_eq!(config.database.path, "data/classhub.db");

        assert!(config.auth.access_token_secret.is_empty());
        assert_eq!(config.auth.access_token_expiry_secs, 86_400);
        assert_eq!(config.auth.refresh_token_expiry_days, 10);
        assert_eq!(config.auth.cookie_expiry_days, 7);

        assert_eq!(config.uploads.temp_dir, "public/temp");
        assert_eq!(config.uploads.max_file_size_mb, 10);

        assert_eq!(config.storage.backend, StorageBackend::Local);
        assert_eq!(config.storage.local.path, "data/media");
        assert_eq!(config.storage.cloudinary.delete_resource_type, "image");

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.file, "logs/classhub.log");
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 3000
cors_origins = ["http://localhost:5173"]
login_rate_limit = 3
trust_proxy_headers = true

[database]
path = "custom/db.sqlite"

[auth]
access_token_secret = "access"
access_token_expiry_secs = 600
refresh_token_secret = "refresh"
refresh_token_expiry_days = 30
cookie_expiry_days = 1

[uploads]
temp_dir = "tmp/uploads"
max_file_size_mb = 25

[storage]
backend = "cloudinary"

[storage.cloudinary]
cloud_name = "demo"
api_key = "123"
api_secret = "shh"
delete_resource_type = "raw"

[logging]
level = "debug"
file = "custom/app.log"
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.cors_origins, vec!["http://localhost:5173"]);
        assert_eq!(config.server.login_rate_limit, 3);
        assert!(config.server.trust_proxy_headers);
        assert_eq!(config.database.path, "custom/db.sqlite");
        assert_eq!(config.auth.access_token_secret, "access");
        assert_eq!(config.auth.access_token_expiry_secs, 600);
        assert_eq!(config.auth.refresh_token_secret, "refresh");
        assert_eq!(config.auth.refresh_token_expiry_days, 30);
        assert_eq!(config.auth.cookie_expiry_days, 1);
        assert_eq!(config.uploads.temp_dir, "tmp/uploads");
        assert_eq!(config.uploads.max_file_size_mb, 25);
        assert_eq!(config.storage.backend, StorageBackend::Cloudinary);
        assert_eq!(config.storage.cloudinary.cloud_name, "demo");
        assert_eq!(config.storage.cloudinary.delete_resource_type, "raw");
        assert_eq!(
            config.storage.cloudinary.api_base,
            "https://api.cloudinary.com/v1_1"
        );
        assert_eq!(config.logging.level, "debug");

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_empty_config() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.storage.backend, StorageBackend::Local);
    }

    #[test]
    fn test_parse_invalid_config() {
        let result = Config::parse("this is not valid toml [[[");
        match result {
            Err(ClassHubError::Config(msg)) => assert!(msg.contains("config parse error")),
            other => panic!("Expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = Config::load("nonexistent.toml");
        assert!(matches!(result, Err(ClassHubError::Io(_))));
    }

    #[test]
    fn test_validate_missing_secrets() {
        let config = Config::default();
        let result = config.validate();
        assert!(matches!(result, Err(ClassHubError::Config(msg)) if msg.contains("secret")));
    }

    #[test]
    fn test_validate_cloudinary_incomplete() {
        let mut config = Config::default();
        config.auth.access_token_secret = "a".to_string();
        config.auth.refresh_token_secret = "r".to_string();
        config.storage.backend = StorageBackend::Cloudinary;
        config.storage.cloudinary.cloud_name = "demo".to_string();

        let result = config.validate();
        assert!(matches!(result, Err(ClassHubError::Config(msg)) if msg.contains("cloudinary")));
    }

    #[test]
    fn test_apply_env_overrides() {
        let original = std::env::var("CLASSHUB_REFRESH_TOKEN_SECRET").ok();

        std::env::set_var("CLASSHUB_REFRESH_TOKEN_SECRET", "env-refresh");
        let mut config = Config::default();
        config.auth.refresh_token_secret = "file-refresh".to_string();
        config.apply_env_overrides();
        assert_eq!(config.auth.refresh_token_secret, "env-refresh");

        std::env::set_var("CLASSHUB_REFRESH_TOKEN_SECRET", "");
        let mut config = Config::default();
        config.auth.refresh_token_secret = "file-refresh".to_string();
        config.apply_env_overrides();
        assert_eq!(config.auth.refresh_token_secret, "file-refresh");

        match original {
            Some(val) => std::env::set_var("CLASSHUB_REFRESH_TOKEN_SECRET", val),
            None => std::env::remove_var("CLASSHUB_REFRESH_TOKEN_SECRET"),
        }
    }
}
