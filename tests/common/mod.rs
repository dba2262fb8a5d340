//! Shared helpers for the web API tests.
//!
//! Builds the real router over an in-memory database and a scripted media
//! store that can be told which uploads and deletions fail.

#![allow(dead_code)]

use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::header::{AUTHORIZATION, SET_COOKIE};
use axum_extra::extract::cookie::Cookie;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::{TestResponse, TestServer};
use serde_json::{json, Value};
use tempfile::TempDir;

use classhub::auth::AccessTokenVerifier;
use classhub::web::handlers::AppState;
use classhub::web::middleware::RateLimitState;
use classhub::web::router::create_router;
use classhub::{public_id_from_url, ClassHubError, Config, Database, MediaStore, Result};

pub const TEST_PASSWORD: &str = "password123";

/// Media store whose failures are scripted by file name.
#[derive(Default)]
pub struct FlakyStore {
    failing_uploads: HashSet<String>,
    failing_deletes: HashSet<String>,
    deleted: Mutex<Vec<String>>,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uploads of files whose name contains `marker` fail.
    pub fn fail_uploads_containing(mut self, marker: &str) -> Self {
        self.failing_uploads.insert(marker.to_string());
        self
    }

    /// Deletions of public ids containing `marker` fail.
    pub fn fail_deletes_containing(mut self, marker: &str) -> Self {
        self.failing_deletes.insert(marker.to_string());
        self
    }

    /// Public ids deleted so far.
    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaStore for FlakyStore {
    async fn upload(&self, path: &Path) -> Result<String> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        if self.failing_uploads.iter().any(|m| name.contains(m)) {
            return Err(ClassHubError::Storage("upload rejected".to_string()));
        }
        Ok(format!("https://media.test/classhub/{name}"))
    }

    async fn delete(&self, public_id: &str) -> Result<()> {
        if self.failing_deletes.iter().any(|m| public_id.contains(m)) {
            return Err(ClassHubError::Storage("destroy failed".to_string()));
        }
        self.deleted.lock().unwrap().push(public_id.to_string());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "flaky"
    }
}

/// A running test application.
pub struct TestApp {
    pub server: TestServer,
    pub db: Arc<Database>,
    pub store: Arc<FlakyStore>,
    pub temp_dir: TempDir,
}

impl TestApp {
    /// Spawn an app with a store that never fails.
    pub async fn spawn() -> Self {
        Self::with_store(FlakyStore::new()).await
    }

    /// Spawn an app around the given store.
    pub async fn with_store(store: FlakyStore) -> Self {
        let temp_dir = tempfile::tempdir().unwrap();

        let mut config = Config::default();
        config.auth.access_token_secret = "test-access-secret".to_string();
        config.auth.refresh_token_secret = "test-refresh-secret".to_string();
        config.server.login_rate_limit = 1000;
        config.uploads.temp_dir = temp_dir.path().join("spool").to_string_lossy().to_string();
        config.uploads.max_file_size_mb = 1;

        let db = Arc::new(Database::open_in_memory().await.unwrap());
        let store = Arc::new(store);
        let media_store: Arc<dyn MediaStore> = store.clone();

        let app_state = Arc::new(AppState::new(db.clone(), &config, media_store));
        let verifier = Arc::new(AccessTokenVerifier::new(&config.auth.access_token_secret));
        let rate_limit = Arc::new(RateLimitState::new(config.server.login_rate_limit));

        let router = create_router(app_state, verifier, rate_limit, &config.server.cors_origins);
        let server = TestServer::new(router).unwrap();

        Self {
            server,
            db,
            store,
            temp_dir,
        }
    }

    /// Files still sitting in the upload spool directory.
    pub fn spooled_files(&self) -> usize {
        match std::fs::read_dir(self.temp_dir.path().join("spool")) {
            Ok(entries) => entries.count(),
            Err(_) => 0,
        }
    }

    /// Register a user and return the response body.
    pub async fn register(&self, full_name: &str, email: &str, password: &str) -> Value {
        self.server
            .post("/api/users/register")
            .json(&json!({
                "fullName": full_name,
                "email": email,
                "password": password,
            }))
            .await
            .json::<Value>()
    }

    /// Log in and return the access token taken from its cookie.
    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = self
            .server
            .post("/api/users/login")
            .json(&json!({ "email": email, "password": password }))
            .await;
        response.assert_status_ok();
        session_cookies(&response)
            .into_iter()
            .find(|c| c.name() == "accessToken")
            .map(|c| c.value().to_string())
            .unwrap()
    }

    /// Register and log in a user named after `handle`; returns the access token.
    pub async fn sign_up(&self, handle: &str) -> String {
        let email = format!("{handle}@example.com");
        self.register(handle, &email, TEST_PASSWORD).await;
        self.login(&email, TEST_PASSWORD).await
    }

    /// Upload a multipart form as the given user.
    pub async fn upload(&self, path: &str, token: &str, form: MultipartForm) -> TestResponse {
        self.server
            .post(path)
            .add_header(AUTHORIZATION, bearer(token))
            .multipart(form)
            .await
    }
}

/// Cookies set by a response.
pub fn session_cookies(response: &TestResponse) -> Vec<Cookie<'static>> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .map(|v| Cookie::parse(v.to_str().unwrap().to_string()).unwrap())
        .collect()
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

/// A multipart form with a title and one part per file name.
pub fn upload_form(title: &str, file_names: &[&str]) -> MultipartForm {
    let mut form = MultipartForm::new()
        .add_text("title", title)
        .add_text("text", format!("{title} notes"));
    for name in file_names {
        let part = Part::bytes(format!("contents of {name}").into_bytes())
            .file_name(name.to_string())
            .mime_type("application/pdf");
        form = form.add_part("resource", part);
    }
    form
}

/// Public id of a stored URL.
pub fn public_id(url: &Value) -> String {
    public_id_from_url(url.as_str().unwrap())
}
