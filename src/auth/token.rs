//! Access and refresh token minting.
//!
//! Both tokens are HS256 JWTs signed with separate secrets. The access token
//! carries enough identity to authorize a request without a database hit;
//! the refresh token only names the user.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::db::User;
use crate::{ClassHubError, Result};

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (user ID).
    pub sub: i64,
    /// User email.
    pub email: String,
    /// User display name.
    pub full_name: String,
    /// Issued at (unix seconds).
    pub iat: u64,
    /// Expiration (unix seconds).
    pub exp: u64,
    /// Unique token ID.
    pub jti: String,
}

/// Claims carried by a refresh token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// Subject (user ID).
    pub sub: i64,
    /// Issued at (unix seconds).
    pub iat: u64,
    /// Expiration (unix seconds).
    pub exp: u64,
    /// Unique token ID.
    pub jti: String,
}

/// A freshly minted access/refresh pair.
#[derive(Debug, Clone)]
pub struct TokenPair {
    /// Short-lived access token.
    pub access_token: String,
    /// Long-lived refresh token.
    pub refresh_token: String,
}

/// Mints access and refresh tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    access_key: EncodingKey,
    refresh_key: EncodingKey,
    access_expiry_secs: u64,
    refresh_expiry_secs: u64,
}

impl TokenIssuer {
    /// Create an issuer from explicit secrets and lifetimes.
    pub fn new(
        access_secret: &str,
        access_expiry_secs: u64,
        refresh_secret: &str,
        refresh_expiry_days: u64,
    ) -> Self {
        Self {
            access_key: EncodingKey::from_secret(access_secret.as_bytes()),
            refresh_key: EncodingKey::from_secret(refresh_secret.as_bytes()),
            access_expiry_secs,
            refresh_expiry_secs: refresh_expiry_days * 24 * 60 * 60,
        }
    }

    /// Create an issuer from the `[auth]` configuration section.
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(
            &config.access_token_secret,
            config.access_token_expiry_secs,
            &config.refresh_token_secret,
            config.refresh_token_expiry_days,
        )
    }

    fn now() -> u64 {
        chrono::Utc::now().timestamp().max(0) as u64
    }

    /// Mint an access token for a user.
    pub fn access_token(&self, user: &User) -> Result<String> {
        let now = Self::now();
        let claims = AccessClaims {
            sub: user.id,
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            iat: now,
            exp: now + self.access_expiry_secs,
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.access_key)
            .map_err(|e| ClassHubError::Token(format!("access token: {e}")))
    }

    /// Mint a refresh token for a user.
    pub fn refresh_token(&self, user_id: i64) -> Result<String> {
        let now = Self::now();
        let claims = RefreshClaims {
            sub: user_id,
            iat: now,
            exp: now + self.refresh_expiry_secs,
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.refresh_key)
            .map_err(|e| ClassHubError::Token(format!("refresh token: {e}")))
    }

    /// Mint both tokens.
    pub fn issue_pair(&self, user: &User) -> Result<TokenPair> {
        Ok(TokenPair {
            access_token: self.access_token(user)?,
            refresh_token: self.refresh_token(user.id)?,
        })
    }
}

/// Verifies access tokens.
#[derive(Clone)]
pub struct AccessTokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl AccessTokenVerifier {
    /// Create a verifier for tokens signed with `secret`.
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::default();
        validation.validate_exp = true;

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Decode and validate an access token.
    pub fn verify(&self, token: &str) -> Result<AccessClaims> {
        decode::<AccessClaims>(token, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| ClassHubError::Auth(format!("invalid access token: {e}")))
    }
}
