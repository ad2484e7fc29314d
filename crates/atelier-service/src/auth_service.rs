//! Authentication service implementation.

use crate::user_service::UserService;
use atelier_core::domain::{Auth, User};
use atelier_core::{guarded, DomainError, Entity, Interface, ResultValue};
use atelier_security::CredentialHasher;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

/// Authentication service trait.
#[async_trait]
pub trait AuthService: Interface + Send + Sync {
    /// Returns the user when `password` matches.
    ///
    /// Unknown usernames fail with `GetUsersByUsername-E02`, wrong passwords
    /// with `AuthService-Authenticate-E02` (401).
    async fn authenticate(&self, username: &str, password: &str) -> ResultValue<User>;

    /// [`AuthService::authenticate`] with submitted credentials.
    async fn authenticate_credentials(&self, credentials: &Auth) -> ResultValue<User> {
        self.authenticate(&credentials.username, &credentials.password).await
    }
}

/// Authentication service implementation.
pub struct AuthServiceImpl {
    users: Arc<dyn UserService>,
    hasher: Arc<dyn CredentialHasher>,
}

impl AuthServiceImpl {
    /// Creates a new authentication service.
    pub fn new(users: Arc<dyn UserService>, hasher: Arc<dyn CredentialHasher>) -> Self {
        Self { users, hasher }
    }
}

#[async_trait]
impl AuthService for AuthServiceImpl {
    async fn authenticate(&self, username: &str, password: &str) -> ResultValue<User> {
        guarded("AuthService-Authenticate", async move {
            let user = self.users.get_user_by_username(username).await.value_or_raise(None)?;

            if self.hasher.verify(&format!("{password}{}", user.salt), &user.password)? {
                info!(user_id = %user.id(), "User authenticated");
                Ok(ResultValue::success(user))
            } else {
                warn!(user_id = %user.id(), "Authentication failed: invalid credentials");
                Ok(ResultValue::failure(
                    DomainError::unauthorized("AuthService-Authenticate-E02", "Invalid credentials"),
                ))
            }
        })
        .await
    }
}
