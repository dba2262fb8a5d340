//! User handlers: registration, login, logout and current user.

use axum::extract::State;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::sync::Arc;

use crate::auth::{close_session, issue_session, open_session, register, RegistrationRequest};
use crate::db::UserRepository;
use crate::web::dto::{
    ApiResponse, LoginRequest, RegisterRequest, UserResponse, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::middleware::{AuthUser, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};

use super::AppState;

fn session_cookie(name: &'static str, value: String, expiry_days: i64) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .expires(time::OffsetDateTime::now_utc() + time::Duration::days(expiry_days))
        .build()
}

/// An expired, empty cookie that makes the client drop `name`.
fn removal_cookie(name: &'static str) -> Cookie<'static> {
    let mut cookie = Cookie::build((name, ""))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .build();
    cookie.make_removal();
    cookie
}

fn with_session_cookies(
    jar: CookieJar,
    access_token: &str,
    refresh_token: &str,
    expiry_days: i64,
) -> CookieJar {
    jar.add(session_cookie(ACCESS_TOKEN_COOKIE, access_token.to_string(), expiry_days))
        .add(session_cookie(REFRESH_TOKEN_COOKIE, refresh_token.to_string(), expiry_days))
}

/// POST /api/users/register - Create an account and start a session.
pub async fn register_user(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(CookieJar, ApiResponse<UserResponse>), ApiError> {
    let request = RegistrationRequest::new(req.full_name, req.email, req.password);
    let user = register(state.pool(), &request).await?;

    let session = issue_session(state.pool(), &state.tokens, user).await?;
    let jar = with_session_cookies(
        jar,
        &session.tokens.access_token,
        &session.tokens.refresh_token,
        state.cookie_expiry_days,
    );

    Ok((
        jar,
        ApiResponse::created(UserResponse::from(&session.user), "User registered successfully"),
    ))
}

/// POST /api/users/login - Start a session.
///
/// The tokens travel only in the HttpOnly cookies; the body is the user.
pub async fn login_user(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<(CookieJar, ApiResponse<UserResponse>), ApiError> {
    let session = open_session(state.pool(), &state.tokens, &req.email, &req.password).await?;

    let jar = with_session_cookies(
        jar,
        &session.tokens.access_token,
        &session.tokens.refresh_token,
        state.cookie_expiry_days,
    );
    Ok((
        jar,
        ApiResponse::ok(UserResponse::from(&session.user), "User logged in successfully"),
    ))
}

/// POST /api/users/logout - End the session.
pub async fn logout_user(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    jar: CookieJar,
) -> Result<(CookieJar, ApiResponse<serde_json::Value>), ApiError> {
    close_session(state.pool(), auth.id()).await?;

    let jar = jar
        .add(removal_cookie(ACCESS_TOKEN_COOKIE))
        .add(removal_cookie(REFRESH_TOKEN_COOKIE));

    Ok((jar, ApiResponse::ok(serde_json::json!({}), "User logged out")))
}

/// GET /api/users/current-user - The authenticated user.
pub async fn current_user(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<ApiResponse<UserResponse>, ApiError> {
    let user = UserRepository::new(state.pool())
        .get_by_id(auth.id())
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid access token"))?;

    Ok(ApiResponse::ok(
        UserResponse::from(&user),
        "Current user fetched successfully",
    ))
}
