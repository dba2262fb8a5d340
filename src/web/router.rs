//! Router configuration for Web API.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, patch, post},
    Router,
};
use std::path::Path;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::dto::{ApiResponse, HealthResponse};
use super::handlers::{
    create_classroom, current_user, delete_classroom, delete_resource, list_classrooms,
    login_user, logout_user, my_resources, register_user, search_classrooms, search_resources,
    update_classroom, upload_resource, upload_resource_to_classroom, AppState,
};
use super::middleware::{create_cors_layer, jwt_auth, login_rate_limit, RateLimitState};
use crate::auth::AccessTokenVerifier;
use crate::resource::MAX_FILES_PER_UPLOAD;

/// Allowance for the non-file multipart fields and framing.
const BODY_LIMIT_SLACK: usize = 1024 * 1024;

/// Create the main API router.
pub fn create_router(
    app_state: Arc<AppState>,
    verifier: Arc<AccessTokenVerifier>,
    rate_limit: Arc<RateLimitState>,
    cors_origins: &[String],
) -> Router {
    let credential_routes = Router::new()
        .route("/register", post(register_user))
        .route("/login", post(login_user))
        .layer(middleware::from_fn(move |req, next| {
            let state = rate_limit.clone();
            login_rate_limit(state, req, next)
        }));

    let user_routes = Router::new()
        .merge(credential_routes)
        .route("/logout", post(logout_user))
        .route("/current-user", get(current_user));

    let classroom_routes = Router::new()
        .route("/", post(create_classroom).get(list_classrooms))
        .route("/search", get(search_classrooms))
        .route("/:id", patch(update_classroom).delete(delete_classroom));

    let body_limit = app_state
        .max_file_size
        .saturating_mul(MAX_FILES_PER_UPLOAD + 1)
        .saturating_add(BODY_LIMIT_SLACK);

    let resource_routes = Router::new()
        .route("/", post(upload_resource))
        .route("/search", get(search_resources))
        .route("/mine", get(my_resources))
        .route(
            "/:id",
            post(upload_resource_to_classroom).delete(delete_resource),
        )
        .layer(DefaultBodyLimit::max(body_limit));

    let api_routes = Router::new()
        .nest("/users", user_routes)
        .nest("/classrooms", classroom_routes)
        .nest("/resources", resource_routes);

    Router::new()
        .nest("/api", api_routes)
        .merge(create_health_router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(middleware::from_fn(move |req, next| {
                    let verifier = verifier.clone();
                    jwt_auth(verifier, req, next)
                })),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router<S: Clone + Send + Sync + 'static>() -> Router<S> {
    Router::new().route("/health", get(health_check))
}

/// Serve the local media store's directory under `mount`.
pub fn create_media_router<S: Clone + Send + Sync + 'static>(mount: &str, dir: &Path) -> Router<S> {
    Router::new().nest_service(mount, ServeDir::new(dir))
}

/// Path under which locally stored media is served, taken from its public base URL.
///
/// Returns `None` when the URL has no usable path (the root cannot be nested).
pub fn media_mount_path(public_base_url: &str) -> Option<String> {
    let path = match url::Url::parse(public_base_url) {
        Ok(url) => url.path().to_string(),
        Err(_) => public_base_url.to_string(),
    };
    let path = path.trim_end_matches('/');
    if path.is_empty() || !path.starts_with('/') || path.starts_with("/api") {
        return None;
    }
    Some(path.to_string())
}

/// Health check handler.
async fn health_check() -> ApiResponse<HealthResponse> {
    ApiResponse::ok(
        HealthResponse {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
        },
        "Service is healthy",
    )
}
