//! # rr-auth-simple
//!
//! Argon2 + HS256 JWT implementation of `AuthProvider`.
//! Handles password hashing, API token pairs and form-login session tokens.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rr_core::error::{AppError, Result};
use rr_core::models::{Claims, TokenKind, TokenPair, User};
use rr_core::traits::AuthProvider;
use uuid::Uuid;

pub const INVALID_TOKEN: &str = "Token is invalid or expired";

/// Lifetimes of the three token kinds.
#[derive(Debug, Clone, Copy)]
pub struct TokenTtls {
    pub access: Duration,
    pub refresh: Duration,
    pub session: Duration,
}

impl Default for TokenTtls {
    fn default() -> Self {
        Self {
            access: Duration::minutes(5),
            refresh: Duration::days(1),
            session: Duration::days(14),
        }
    }
}

pub struct SimpleAuthProvider {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttls: TokenTtls,
}

impl SimpleAuthProvider {
    /// Accepts the HS256 signing secret (e.g., from `auth.jwt_secret`).
    pub fn new(secret: &[u8], ttls: TokenTtls) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
            ttls,
        }
    }

    fn issue(&self, user: &User, kind: TokenKind) -> Result<String> {
        let ttl = match kind {
            TokenKind::Access => self.ttls.access,
            TokenKind::Refresh => self.ttls.refresh,
            TokenKind::Session => self.ttls.session,
        };
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            token_type: kind,
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("token signing failed: {e}")))
    }
}

#[async_trait]
impl AuthProvider for SimpleAuthProvider {
    fn hash_password(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))
    }

    /// Verifies if a provided password matches a stored Argon2 hash.
    async fn verify_password(&self, password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(p) => p,
            Err(_) => return false,
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    fn issue_tokens(&self, user: &User) -> Result<TokenPair> {
        Ok(TokenPair {
            access: self.issue(user, TokenKind::Access)?,
            refresh: self.issue(user, TokenKind::Refresh)?,
        })
    }

    fn issue_session(&self, user: &User) -> Result<String> {
        self.issue(user, TokenKind::Session)
    }

    fn refresh_access(&self, refresh_token: &str) -> Result<String> {
        let claims = self.validate(refresh_token, TokenKind::Refresh)?;
        let now = Utc::now();
        let access = Claims {
            token_type: TokenKind::Access,
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttls.access).timestamp(),
            ..claims
        };
        encode(&Header::new(Algorithm::HS256), &access, &self.encoding)
            .map_err(|e| AppError::Internal(format!("token signing failed: {e}")))
    }

    fn validate(&self, token: &str, kind: TokenKind) -> Result<Claims> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "token rejected");
            AppError::Unauthorized(INVALID_TOKEN.into())
        })?;
        if data.claims.token_type != kind {
            tracing::debug!(expected = ?kind, got = ?data.claims.token_type, "wrong token kind");
            return Err(AppError::Unauthorized(INVALID_TOKEN.into()));
        }
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rr_core::models::Role;

    const SECRET: &[u8] = b"test-secret-test-secret-test-secret!";

    fn user() -> User {
        User {
            id: 42,
            username: "alice".into(),
            email: "alice@example.com".into(),
            password_hash: String::new(),
            role: Role::Customer,
            last_login: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn hash_then_verify() {
        let auth = SimpleAuthProvider::new(SECRET, TokenTtls::default());
        let hash = auth.hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(auth.verify_password("correct horse", &hash).await);
        assert!(!auth.verify_password("battery staple", &hash).await);
        assert!(!auth.verify_password("correct horse", "not-a-phc-string").await);
    }

    #[test]
    fn access_token_carries_user() {
        let auth = SimpleAuthProvider::new(SECRET, TokenTtls::default());
        let pair = auth.issue_tokens(&user()).unwrap();
        let claims = auth.validate(&pair.access, TokenKind::Access).unwrap();
        assert_eq!(claims.user_id().unwrap(), 42);
        assert_eq!(claims.username, "alice");
    }

    #[test]
    fn kinds_are_not_interchangeable() {
        let auth = SimpleAuthProvider::new(SECRET, TokenTtls::default());
        let pair = auth.issue_tokens(&user()).unwrap();
        assert!(auth.validate(&pair.access, TokenKind::Refresh).is_err());
        assert!(auth.validate(&pair.refresh, TokenKind::Access).is_err());
        assert!(auth.refresh_access(&pair.access).is_err());
        let session = auth.issue_session(&user()).unwrap();
        assert!(auth.validate(&session, TokenKind::Access).is_err());
        assert!(auth.validate(&session, TokenKind::Session).is_ok());
    }

    #[test]
    fn refresh_yields_fresh_access() {
        let auth = SimpleAuthProvider::new(SECRET, TokenTtls::default());
        let pair = auth.issue_tokens(&user()).unwrap();
        let access = auth.refresh_access(&pair.refresh).unwrap();
        let claims = auth.validate(&access, TokenKind::Access).unwrap();
        assert_eq!(claims.sub, "42");
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let ttls = TokenTtls { access: Duration::minutes(-10), ..TokenTtls::default() };
        let auth = SimpleAuthProvider::new(SECRET, ttls);
        let pair = auth.issue_tokens(&user()).unwrap();
        assert_eq!(
            auth.validate(&pair.access, TokenKind::Access),
            Err(AppError::Unauthorized(INVALID_TOKEN.into()))
        );
    }

    #[test]
    fn foreign_signature_is_rejected() {
        let ours = SimpleAuthProvider::new(SECRET, TokenTtls::default());
        let theirs = SimpleAuthProvider::new(b"another-secret-another-secret-!!", TokenTtls::default());
        let pair = theirs.issue_tokens(&user()).unwrap();
        assert!(ours.validate(&pair.access, TokenKind::Access).is_err());
    }
}
