//! Identity provider contract.
//!
//! Token issuance is opaque to the rest of the system: callers only see an
//! access token and whether its holder is an administrator.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::config::AuthConfig;
use crate::{CoreError, Result};

/// Result of a successful login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessGrant {
    pub access_token: String,
    pub is_admin: bool,
}

/// Authenticated caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub username: String,
    pub is_admin: bool,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Exchange credentials for an access token
    async fn login(&self, username: &str, password: &str) -> Result<AccessGrant>;

    /// Resolve a bearer token to the identity it was issued for
    async fn authenticate(&self, token: &str) -> Result<Identity>;
}

struct UserEntry {
    /// Argon2id hash in PHC string format
    password_hash: String,
    is_admin: bool,
}

struct Session {
    identity: Identity,
    expires_at: DateTime<Utc>,
}

/// In-memory identity provider for development and testing
#[derive(Clone)]
pub struct InMemoryIdentityProvider {
    users: Arc<RwLock<HashMap<String, UserEntry>>>,
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    token_ttl: Duration,
}

impl InMemoryIdentityProvider {
    pub fn new(token_ttl: Duration) -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
            sessions: Arc::new(RwLock::new(HashMap::new())),
            token_ttl,
        }
    }

    /// Create a provider seeded with the configured administrator
    pub async fn from_config(config: &AuthConfig) -> Result<Self> {
        let provider = Self::new(config.token_ttl());
        provider
            .register(&config.admin_username, &config.admin_password, true)
            .await?;
        Ok(provider)
    }

    /// Add or replace a user account
    pub async fn register(&self, username: &str, password: &str, is_admin: bool) -> Result<()> {
        let password_hash = hash_password(password)?;
        self.users.write().await.insert(
            username.to_string(),
            UserEntry {
                password_hash,
                is_admin,
            },
        );
        Ok(())
    }
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CoreError::Credentials(e.to_string()))
}

fn verify_password(password: &str, password_hash: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            warn!("Stored password hash is malformed: {}", e);
            false
        }
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn login(&self, username: &str, password: &str) -> Result<AccessGrant> {
        let is_admin = {
            let users = self.users.read().await;
            match users.get(username) {
                Some(user) if verify_password(password, &user.password_hash) => user.is_admin,
                _ => {
                    warn!(username = %username, "Rejected login");
                    return Err(CoreError::Unauthorized(
                        "Incorrect username or password".to_string(),
                    ));
                }
            }
        };

        let access_token = uuid::Uuid::new_v4().simple().to_string();
        let ttl = chrono::Duration::from_std(self.token_ttl)
            .unwrap_or_else(|_| chrono::Duration::days(8));

        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, session| session.expires_at > now);
        sessions.insert(
            access_token.clone(),
            Session {
                identity: Identity {
                    username: username.to_string(),
                    is_admin,
                },
                expires_at: now + ttl,
            },
        );
        drop(sessions);

        debug!(username = %username, is_admin = is_admin, "Issued access token");

        Ok(AccessGrant {
            access_token,
            is_admin,
        })
    }

    async fn authenticate(&self, token: &str) -> Result<Identity> {
        let mut sessions = self.sessions.write().await;
        match sessions.get(token) {
            Some(session) if session.expires_at > Utc::now() => Ok(session.identity.clone()),
            Some(_) => {
                sessions.remove(token);
                Err(CoreError::Unauthorized("Token expired".to_string()))
            }
            None => Err(CoreError::Unauthorized("Invalid token".to_string())),
        }
    }
}
