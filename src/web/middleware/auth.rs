//! Access-token authentication.
//!
//! The verifier is injected into request extensions by [`jwt_auth`]; the
//! [`AuthUser`] extractor reads the token from an `Authorization: Bearer`
//! header or, failing that, the `accessToken` cookie.

use axum::{
    async_trait,
    body::Body,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, Request},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use std::sync::Arc;

use crate::auth::{AccessClaims, AccessTokenVerifier};
use crate::web::error::ApiError;

/// Name of the access token cookie.
pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";

/// Name of the refresh token cookie.
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

/// Extractor for authenticated users.
#[derive(Debug, Clone)]
pub struct AuthUser(pub AccessClaims);

impl AuthUser {
    /// The authenticated user's ID.
    pub fn id(&self) -> i64 {
        self.0.sub
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

fn cookie_token(parts: &Parts) -> Option<String> {
    CookieJar::from_headers(&parts.headers)
        .get(ACCESS_TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .or_else(|| cookie_token(parts))
            .ok_or_else(|| ApiError::unauthorized("Unauthorized request"))?;

        let verifier = parts
            .extensions
            .get::<Arc<AccessTokenVerifier>>()
            .ok_or_else(|| ApiError::internal("Token verifier not configured"))?;

        let claims = verifier.verify(&token).map_err(|e| {
            tracing::debug!(error = %e, "Access token rejected");
            ApiError::unauthorized("Invalid access token")
        })?;

        Ok(AuthUser(claims))
    }
}

/// Middleware function to inject the verifier into request extensions.
pub async fn jwt_auth(
    verifier: Arc<AccessTokenVerifier>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    request.extensions_mut().insert(verifier);
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::COOKIE;

    fn parts(headers: &[(axum::http::HeaderName, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_token() {
        let p = parts(&[(AUTHORIZATION, "Bearer abc.def")]);
        assert_eq!(bearer_token(&p).as_deref(), Some("abc.def"));

        let p = parts(&[(AUTHORIZATION, "Basic xyz")]);
        assert!(bearer_token(&p).is_none());
    }

    #[test]
    fn test_cookie_token() {
        let p = parts(&[(COOKIE, "theme=dark; accessToken=tok123")]);
        assert_eq!(cookie_token(&p).as_deref(), Some("tok123"));

        let p = parts(&[(COOKIE, "refreshToken=r")]);
        assert!(cookie_token(&p).is_none());
    }

    #[tokio::test]
    async fn test_missing_token_rejected() {
        let mut p = parts(&[]);
        p.extensions
            .insert(Arc::new(AccessTokenVerifier::new("secret")));

        let result = AuthUser::from_request_parts(&mut p, &()).await;
        assert!(result.is_err());
    }
}
