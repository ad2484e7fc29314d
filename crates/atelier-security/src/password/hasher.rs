//! Password hashing using Argon2.

use atelier_config::SecurityConfig;
use atelier_core::{DomainException, DomainResult, Interface};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Argon2, Params,
};
use shaku::Component;
use std::sync::Arc;
use tracing::debug;

/// Interface for credential hashing.
///
/// Callers pass the password already concatenated with the user's salt.
pub trait CredentialHasher: Interface + Send + Sync {
    /// Hashes a secret.
    ///
    /// # Errors
    ///
    /// `PasswordHasher-Hash-E01` when Argon2 rejects the input.
    fn hash(&self, secret: &str) -> DomainResult<String>;

    /// Verifies a secret against a stored hash.
    ///
    /// # Errors
    ///
    /// `PasswordHasher-Verify-E01` when the stored hash is malformed.
    fn verify(&self, secret: &str, hash: &str) -> DomainResult<bool>;
}

/// Argon2id password hasher.
#[derive(Component, Clone)]
#[shaku(interface = CredentialHasher)]
pub struct PasswordHasher {
    argon2: Arc<Argon2<'static>>,
}

impl PasswordHasher {
    /// Creates a new password hasher with default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::with_params(Params::DEFAULT)
    }

    #[must_use]
    pub fn with_params(params: Params) -> Self {
        let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);
        Self {
            argon2: Arc::new(argon2),
        }
    }

    /// Creates a password hasher from a memory cost in KiB and an
    /// iteration count, falling back to the defaults when Argon2 rejects
    /// them.
    #[must_use]
    pub fn with_cost(memory_kib: u32, iterations: u32) -> Self {
        let params = Params::new(memory_kib, iterations, 1, None).unwrap_or(Params::DEFAULT);
        Self::with_params(params)
    }

    #[must_use]
    pub fn from_config(config: &SecurityConfig) -> Self {
        Self::with_cost(config.password_hash_memory_kib, config.password_hash_iterations)
    }

    /// Returns the internal Argon2 instance wrapped in Arc.
    ///
    /// This is used for Shaku component parameter extraction.
    #[must_use]
    pub fn argon2_arc(&self) -> Arc<Argon2<'static>> {
        self.argon2.clone()
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialHasher for PasswordHasher {
    fn hash(&self, secret: &str) -> DomainResult<String> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = self.argon2.hash_password(secret.as_bytes(), &salt).map_err(|e| {
            DomainException::internal("PasswordHasher-Hash-E01", format!("Failed to hash password: {e}"))
        })?;

        debug!("Password hashed successfully");
        Ok(hash.to_string())
    }

    fn verify(&self, secret: &str, hash: &str) -> DomainResult<bool> {
        let parsed_hash = PasswordHash::new(hash).map_err(|e| {
            DomainException::internal("PasswordHasher-Verify-E01", format!("Invalid password hash format: {e}"))
        })?;

        match self.argon2.verify_password(secret.as_bytes(), &parsed_hash) {
            Ok(()) => {
                debug!("Password verified successfully");
                Ok(true)
            }
            Err(argon2::password_hash::Error::Password) => {
                debug!("Password verification failed: incorrect password");
                Ok(false)
            }
            Err(e) => Err(DomainException::internal(
                "PasswordHasher-Verify-E01",
                format!("Password verification error: {e}"),
            )),
        }
    }
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast() -> PasswordHasher {
        PasswordHasher::with_cost(64, 1)
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = fast();
        let hash = hasher.hash("MySecurePassword123salt").unwrap();

        assert!(hasher.verify("MySecurePassword123salt", &hash).unwrap());
        assert!(!hasher.verify("MySecurePassword123", &hash).unwrap());
    }

    #[test]
    fn test_different_hashes() {
        let hasher = fast();
        let hash1 = hasher.hash("TestPassword123").unwrap();
        let hash2 = hasher.hash("TestPassword123").unwrap();

        // Same password, different salts
        assert_ne!(hash1, hash2);
        assert!(hasher.verify("TestPassword123", &hash1).unwrap());
        assert!(hasher.verify("TestPassword123", &hash2).unwrap());
    }

    #[test]
    fn test_invalid_hash_format_returns_error() {
        let err = fast().verify("password", "not-a-valid-hash").unwrap_err();
        assert_eq!(err.error_code(), "PasswordHasher-Verify-E01");
        assert_eq!(err.status(), 500);
    }

    #[test]
    fn test_rejected_cost_falls_back_to_defaults() {
        let hasher = PasswordHasher::with_cost(0, 0);
        let hash = hasher.hash("secret").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("secret", &hash).unwrap());
    }

    #[test]
    fn test_from_config() {
        let config = SecurityConfig {
            password_hash_memory_kib: 64,
            password_hash_iterations: 1,
            ..SecurityConfig::default()
        };
        let hasher = PasswordHasher::from_config(&config);
        let hash = hasher.hash("secret").unwrap();
        assert!(hash.contains("m=64,t=1"));
    }

    #[test]
    fn test_interface_object() {
        let hasher: Arc<dyn CredentialHasher> = Arc::new(fast());
        let hash = hasher.hash("TestPass1").unwrap();
        assert!(hasher.verify("TestPass1", &hash).unwrap());
    }

    #[test]
    fn test_hasher_debug_does_not_leak_secrets() {
        let debug_str = format!("{:?}", fast());
        assert_eq!(debug_str, "PasswordHasher { .. }");
    }
}
