//! Web API user tests.
//!
//! Registration, login, logout and the current-user endpoint.

mod common;

use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::StatusCode;
use axum_extra::extract::cookie::Cookie;
use common::{bearer, session_cookies, TestApp, TEST_PASSWORD};
use serde_json::{json, Value};

fn cookie_value(cookies: &[Cookie<'static>], name: &str) -> Option<String> {
    cookies
        .iter()
        .find(|c| c.name() == name)
        .map(|c| c.value().to_string())
}

/// Both session cookies are HttpOnly, Secure, site-wide and expire in 7 days.
fn assert_session_cookies(cookies: &[Cookie<'static>]) {
    let names: Vec<&str> = cookies.iter().map(|c| c.name()).collect();
    assert!(names.contains(&"accessToken"), "cookies: {names:?}");
    assert!(names.contains(&"refreshToken"), "cookies: {names:?}");

    let expected = time::OffsetDateTime::now_utc() + time::Duration::days(7);
    for cookie in cookies {
        assert_eq!(cookie.http_only(), Some(true), "{}", cookie.name());
        assert_eq!(cookie.secure(), Some(true), "{}", cookie.name());
        assert_eq!(cookie.path(), Some("/"), "{}", cookie.name());

        let expires = cookie
            .expires_datetime()
            .unwrap_or_else(|| panic!("{} has no Expires", cookie.name()));
        let drift = (expires - expected).abs();
        assert!(
            drift <= time::Duration::minutes(1),
            "{} expires at {expires}, expected about {expected}",
            cookie.name()
        );
    }
}

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
async fn test_register_success() {
    let app = TestApp::spawn().await;

    let response = app
        .server
        .post("/api/users/register")
        .json(&json!({
            "fullName": "Ada Lovelace",
            "email": "ada@example.com",
            "password": TEST_PASSWORD,
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    assert_session_cookies(&session_cookies(&response));

    let body: Value = response.json();
    assert_eq!(body["statusCode"], 201);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["fullName"], "Ada Lovelace");
    assert_eq!(body["data"]["email"], "ada@example.com");
    assert!(body["data"].get("password").is_none());
    assert!(body["data"].get("refreshToken").is_none());
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let app = TestApp::spawn().await;
    app.register("Ada", "ada@example.com", TEST_PASSWORD).await;

    let response = app
        .server
        .post("/api/users/register")
        .json(&json!({
            "fullName": "Someone Else",
            "email": "ADA@example.com",
            "password": "password456",
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "User already exists");
}

#[tokio::test]
async fn test_register_validation_errors() {
    let app = TestApp::spawn().await;

    let response = app
        .server
        .post("/api/users/register")
        .json(&json!({
            "fullName": "   ",
            "email": "not-an-email",
            "password": "short",
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["statusCode"], 400);
    assert!(body["errors"]["fullName"].is_array());
    assert!(body["errors"]["email"].is_array());
    assert!(body["errors"]["password"].is_array());
}

#[tokio::test]
async fn test_register_malformed_json() {
    let app = TestApp::spawn().await;

    let response = app
        .server
        .post("/api/users/register")
        .content_type("application/json")
        .text("{not json")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["success"], false);
}

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
async fn test_login_sets_session_cookies() {
    let app = TestApp::spawn().await;
    app.register("Ada", "ada@example.com", TEST_PASSWORD).await;

    let response = app
        .server
        .post("/api/users/login")
        .json(&json!({ "email": "ada@example.com", "password": TEST_PASSWORD }))
        .await;

    response.assert_status_ok();
    let cookies = session_cookies(&response);
    assert_eq!(cookies.len(), 2);
    assert_session_cookies(&cookies);

    let body: Value = response.json();
    assert_eq!(body["message"], "User logged in successfully");
    assert_eq!(body["data"]["email"], "ada@example.com");
    assert_eq!(body["data"]["fullName"], "Ada");
    for secret in ["accessToken", "refreshToken", "password", "user"] {
        assert!(body["data"].get(secret).is_none(), "{secret} in login body");
    }
}

#[tokio::test]
async fn test_login_wrong_password_sets_no_cookies() {
    let app = TestApp::spawn().await;
    app.register("Ada", "ada@example.com", TEST_PASSWORD).await;

    let response = app
        .server
        .post("/api/users/login")
        .json(&json!({ "email": "ada@example.com", "password": "wrong-password" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(session_cookies(&response).is_empty());
    let body: Value = response.json();
    assert_eq!(body["message"], "Invalid credentials");
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_login_unknown_user() {
    let app = TestApp::spawn().await;

    let response = app
        .server
        .post("/api/users/login")
        .json(&json!({ "email": "ghost@example.com", "password": TEST_PASSWORD }))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert!(session_cookies(&response).is_empty());
    assert_eq!(response.json::<Value>()["message"], "User not found");
}

// ============================================================================
// Current user / logout
// ============================================================================

#[tokio::test]
async fn test_register_login_current_user_round_trip() {
    let app = TestApp::spawn().await;
    let registered = app.register("Ada", "ada@example.com", TEST_PASSWORD).await;
    let token = app.login("ada@example.com", TEST_PASSWORD).await;

    let response = app
        .server
        .get("/api/users/current-user")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;

    response.assert_status_ok();
    let user = response.json::<Value>()["data"].clone();
    assert_eq!(user["id"], registered["data"]["id"]);
    assert_eq!(user["email"], "ada@example.com");
    assert_eq!(user["fullName"], "Ada");
    for secret in ["password", "refreshToken", "otp", "otpExpiry"] {
        assert!(user.get(secret).is_none(), "{secret} leaked");
    }
}

#[tokio::test]
async fn test_current_user_from_cookie() {
    let app = TestApp::spawn().await;
    app.register("Ada", "ada@example.com", TEST_PASSWORD).await;
    let token = app.login("ada@example.com", TEST_PASSWORD).await;

    let response = app
        .server
        .get("/api/users/current-user")
        .add_header(COOKIE, format!("accessToken={token}"))
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["data"]["email"], "ada@example.com");
}

#[tokio::test]
async fn test_current_user_requires_token() {
    let app = TestApp::spawn().await;

    let response = app.server.get("/api/users/current-user").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["message"], "Unauthorized request");

    let response = app
        .server
        .get("/api/users/current-user")
        .add_header(AUTHORIZATION, "Bearer not-a-token")
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_clears_session() {
    let app = TestApp::spawn().await;
    let token = app.sign_up("ada").await;

    let response = app
        .server
        .post("/api/users/logout")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["message"], "User logged out");
    let cookies = session_cookies(&response);
    assert_eq!(cookie_value(&cookies, "accessToken").as_deref(), Some(""));
    assert_eq!(cookie_value(&cookies, "refreshToken").as_deref(), Some(""));

    let user = classhub::UserRepository::new(app.db.pool())
        .get_by_email("ada@example.com")
        .await
        .unwrap()
        .unwrap();
    assert!(user.refresh_token.is_none());
}

#[tokio::test]
async fn test_logout_requires_token() {
    let app = TestApp::spawn().await;

    app.server
        .post("/api/users/logout")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::spawn().await;

    let response = app.server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["data"]["status"], "ok");
}
