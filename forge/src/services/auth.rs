//! Authentication service
//!
//! Handles user registration, login, and JWT access tokens. Passwords are
//! bcrypt-hashed; hashing and verification are CPU-bound and run on a
//! blocking thread.

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use forge_core::{ForgeError, ForgeId, Result, User};
use forge_storage::ForgeStore;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// JWT claims carried by an access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
}

/// A successful authentication result
#[derive(Debug, Clone, Serialize)]
pub struct AuthenticatedUser {
    pub user: User,
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Authentication service for managing users and access tokens
#[derive(Clone)]
pub struct AuthService {
    store: Arc<ForgeStore>,
    jwt_secret: String,
    access_token_expiry: i64, // minutes
}

impl AuthService {
    pub fn new(store: Arc<ForgeStore>, jwt_secret: String, access_token_expiry: i64) -> Self {
        Self {
            store,
            jwt_secret,
            access_token_expiry,
        }
    }

    /// Register a new user and log them in immediately
    pub async fn register(&self, username: String, password: String) -> Result<AuthenticatedUser> {
        if username.trim().is_empty() {
            return Err(ForgeError::validation("username must not be empty"));
        }
        if password.is_empty() {
            return Err(ForgeError::validation("password must not be empty"));
        }

        info!(username = %username, "Registering user");

        // Hash password (CPU-bound, must run in blocking thread)
        let password_hash = tokio::task::spawn_blocking(move || hash(&password, DEFAULT_COST))
            .await
            .map_err(|e| ForgeError::internal(format!("Password hashing failed: {}", e)))?
            .map_err(|e| ForgeError::internal(format!("Password hashing failed: {}", e)))?;

        let user = self.store.create_user(User::new(username, password_hash))?;

        info!(user_id = %user.id, username = %user.username, "User registered");

        self.issue_tokens(user)
    }

    /// Authenticate a user with username and password
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthenticatedUser> {
        debug!(username = %username, "Authenticating user");

        let user = self
            .store
            .find_user_by_username(username)
            .ok_or_else(|| ForgeError::unauthorized("invalid username or password"))?;

        let password_hash = user.password_hash.clone();
        let password = password.to_string();
        let valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
            .await
            .map_err(|e| ForgeError::internal(format!("Password verification failed: {}", e)))?
            .map_err(|e| ForgeError::internal(format!("Password verification failed: {}", e)))?;

        if !valid {
            warn!(username = %username, "Failed authentication attempt");
            return Err(ForgeError::unauthorized("invalid username or password"));
        }

        info!(user_id = %user.id, username = %user.username, "User authenticated");

        self.issue_tokens(user)
    }

    /// Look up a user by id
    pub fn get_user(&self, user_id: ForgeId) -> Result<User> {
        self.store.get_user(user_id)
    }

    /// Decode and validate an access token
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| ForgeError::unauthorized(format!("invalid token: {}", e)))?;

        Ok(token_data.claims)
    }

    fn issue_tokens(&self, user: User) -> Result<AuthenticatedUser> {
        let access_token = self.generate_access_token(&user)?;
        Ok(AuthenticatedUser {
            user,
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expiry * 60,
        })
    }

    fn generate_access_token(&self, user: &User) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::minutes(self.access_token_expiry)).timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| ForgeError::internal(format!("Token generation failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth_service() -> AuthService {
        AuthService::new(Arc::new(ForgeStore::new()), "test-secret".to_string(), 60)
    }

    #[tokio::test]
    async fn test_register_and_login() {
        let auth = auth_service();
        let registered = auth
            .register("alice".to_string(), "s3cret".to_string())
            .await
            .unwrap();
        assert_eq!(registered.user.username, "alice");
        assert_eq!(registered.token_type, "Bearer");

        let logged_in = auth.login("alice", "s3cret").await.unwrap();
        assert_eq!(logged_in.user.id, registered.user.id);

        let claims = auth.verify_token(&logged_in.access_token).unwrap();
        assert_eq!(claims.sub, registered.user.id.to_string());
        assert_eq!(claims.username, "alice");
    }

    #[tokio::test]
    async fn test_wrong_password_rejected() {
        let auth = auth_service();
        auth.register("alice".to_string(), "s3cret".to_string())
            .await
            .unwrap();
        let err = auth.login("alice", "wrong").await.unwrap_err();
        assert!(matches!(err, ForgeError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let auth = auth_service();
        auth.register("alice".to_string(), "one".to_string())
            .await
            .unwrap();
        let err = auth
            .register("alice".to_string(), "two".to_string())
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_garbage_token_rejected() {
        let auth = auth_service();
        assert!(auth.verify_token("not-a-jwt").is_err());
    }
}
