//! Authentication service.
//!
//! Passwords are hashed with Argon2id. Sessions are stateless HS256 bearer
//! tokens; logging out records the token in a revocation cache that forgets
//! entries once the token would have expired anyway.

use std::time::Duration;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use civic_desk_core::{AdminRole, AdminUser, AdminUserId, LoginRequest};

use crate::store::{Store, StoreError};

/// Upper bound on remembered revoked tokens.
const MAX_REVOKED_TOKENS: u64 = 100_000;

/// Errors that can occur during authentication.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown user, wrong role, wrong password or inactive account.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Token is malformed, expired or signed with another key.
    #[error("Invalid or expired token")]
    InvalidToken,

    /// Token was revoked by logging out.
    #[error("Token has been revoked")]
    TokenRevoked,

    /// Password hashing failed.
    #[error("password hashing failed")]
    PasswordHash,

    /// Token could not be signed.
    #[error("token signing failed: {0}")]
    TokenSigning(#[source] jsonwebtoken::errors::Error),

    /// Store lookup failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Claims carried by a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: AdminUserId,
    pub username: String,
    pub role: AdminRole,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
    /// Issue time, seconds since the epoch.
    pub iat: i64,
}

/// Issues, verifies and revokes bearer tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: chrono::Duration,
    revoked: Cache<String, ()>,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("keys", &"[REDACTED]")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Create a token service signing with `secret`.
    #[must_use]
    pub fn new(secret: &SecretString, ttl_hours: u32) -> Self {
        let key = secret.expose_secret().as_bytes();
        let revoked = Cache::builder()
            .max_capacity(MAX_REVOKED_TOKENS)
            .time_to_live(Duration::from_secs(u64::from(ttl_hours) * 3600))
            .build();

        Self {
            encoding: EncodingKey::from_secret(key),
            decoding: DecodingKey::from_secret(key),
            validation: Validation::new(Algorithm::HS256),
            ttl: chrono::Duration::hours(i64::from(ttl_hours)),
            revoked,
        }
    }

    /// Issue a token for `user`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenSigning` if encoding fails.
    pub fn issue(&self, user: &AdminUser) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            user_id: user.id.clone(),
            username: user.username.clone(),
            role: user.role,
            exp: (now + self.ttl).timestamp(),
            iat: now.timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(AuthError::TokenSigning)
    }

    /// Verify a token's signature, expiry and revocation status.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` or `AuthError::TokenRevoked`.
    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        if self.revoked.contains_key(token) {
            return Err(AuthError::TokenRevoked);
        }
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| AuthError::InvalidToken)
    }

    /// Reject `token` for the rest of its lifetime.
    pub async fn revoke(&self, token: &str) {
        self.revoked.insert(token.to_owned(), ()).await;
    }
}

/// Login flow over a [`Store`].
pub struct AuthService<'a> {
    store: &'a dyn Store,
    tokens: &'a TokenService,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(store: &'a dyn Store, tokens: &'a TokenService) -> Self {
        Self { store, tokens }
    }

    /// Check credentials and issue a token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if no active account with that
    /// username and role exists or the password is wrong.
    pub async fn login(&self, request: &LoginRequest) -> Result<(String, AdminUser), AuthError> {
        let account = self
            .store
            .find_account(request.username.trim(), request.role)
            .await?
            .filter(|a| a.user.is_active)
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(&request.password, &account.password_hash)?;

        let token = self.tokens.issue(&account.user)?;
        Ok((token, account.user))
    }

    /// Resolve a token to its active account.
    ///
    /// The account must still exist, be active, and carry the username and
    /// role the token was issued for.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` when the token does not resolve.
    pub async fn authenticate(&self, token: &str) -> Result<AdminUser, AuthError> {
        let claims = self.tokens.verify(token).await?;
        self.store
            .get_admin(&claims.user_id)
            .await?
            .filter(|u| u.is_active && u.username == claims.username && u.role == claims.role)
            .ok_or(AuthError::InvalidToken)
    }
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` on mismatch or unparseable hash.
pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use civic_desk_core::fixtures;

    use super::*;
    use crate::store::MemoryStore;

    fn tokens() -> TokenService {
        TokenService::new(&SecretString::from("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6%"), 24)
    }

    fn login(username: &str, password: &str, role: AdminRole) -> LoginRequest {
        LoginRequest {
            username: username.to_owned(),
            password: password.to_owned(),
            role,
        }
    }

    #[test]
    fn test_password_round_trip() {
        let hash = hash_password("worker123").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("worker123", &hash).is_ok());
        assert!(matches!(
            verify_password("worker124", &hash),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(verify_password("worker123", "not-a-hash").is_err());
    }

    #[tokio::test]
    async fn test_token_claims() {
        let tokens = tokens();
        let admin = fixtures::admins(Utc::now()).remove(0).user;
        let token = tokens.issue(&admin).unwrap();

        let claims = tokens.verify(&token).await.unwrap();
        assert_eq!(claims.user_id.as_str(), "admin");
        assert_eq!(claims.role, AdminRole::MainAdmin);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[tokio::test]
    async fn test_token_from_other_key_is_rejected() {
        let admin = fixtures::admins(Utc::now()).remove(0).user;
        let other = TokenService::new(&SecretString::from("zZ9#yY8@xX7!wW6$vV5%uU4^tT3&sS2*"), 24);
        let token = other.issue(&admin).unwrap();
        assert!(matches!(
            tokens().verify(&token).await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn test_revoked_token_is_rejected() {
        let tokens = tokens();
        let admin = fixtures::admins(Utc::now()).remove(0).user;
        let token = tokens.issue(&admin).unwrap();
        tokens.revoke(&token).await;
        assert!(matches!(
            tokens.verify(&token).await,
            Err(AuthError::TokenRevoked)
        ));
    }

    #[tokio::test]
    async fn test_login_checks_role_and_password() {
        let store = MemoryStore::seeded().unwrap();
        let tokens = tokens();
        let auth = AuthService::new(&store, &tokens);

        let (token, user) = auth
            .login(&login("mike.wilson", "worker123", AdminRole::LowerAdmin))
            .await
            .unwrap();
        assert_eq!(user.id.as_str(), "worker1");
        assert_eq!(auth.authenticate(&token).await.unwrap().id, user.id);

        for bad in [
            login("mike.wilson", "admin123", AdminRole::LowerAdmin),
            login("mike.wilson", "worker123", AdminRole::MainAdmin),
            login("nobody", "worker123", AdminRole::LowerAdmin),
        ] {
            assert!(matches!(
                auth.login(&bad).await,
                Err(AuthError::InvalidCredentials)
            ));
        }
    }
}
