//! Password hashing and verification using Argon2id

use crate::error::AppError;
use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// Memory cost in KiB (64 MiB).
pub const MEMORY_COST_KIB: u32 = 64 * 1024;
/// Number of passes.
pub const TIME_COST: u32 = 2;
/// Lanes.
pub const PARALLELISM: u32 = 1;
/// Digest length in bytes.
pub const OUTPUT_LEN: usize = 32;

/// Input for the hash that unknown-user logins are checked against.
const DUMMY_PASSWORD: &str = "dummy-password-for-unknown-users";

/// Password hasher with fixed cost parameters.
///
/// Hashes are PHC strings (`$argon2id$v=19$m=65536,t=2,p=1$<salt>$<digest>`), so
/// verification reads parameters from the stored hash and keeps working for
/// hashes produced under other parameters.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    dummy_hash: Arc<OnceCell<String>>,
}

impl PasswordHasher {
    pub fn new() -> Self {
        let params = Params::new(MEMORY_COST_KIB, TIME_COST, PARALLELISM, Some(OUTPUT_LEN))
            .expect("Invalid Argon2 params");

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        Self {
            argon2,
            dummy_hash: Arc::new(OnceCell::new()),
        }
    }

    /// Hash a password with a fresh 16-byte salt
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);

        let password_hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!("Failed to hash password: {:?}", e);
                AppError::Internal(format!("failed to hash password: {}", e))
            })?
            .to_string();

        Ok(password_hash)
    }

    /// Verify a password against a stored hash. Mismatch is `false`, never an error.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Stored password hash is unparseable: {:?}", e);
                return false;
            }
        };

        self.argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// Run a full verification against a fixed hash and report failure.
    ///
    /// Used when the account does not exist so the response takes as long as
    /// a wrong password would.
    pub fn verify_dummy(&self, password: &str) -> bool {
        let dummy = self
            .dummy_hash
            .get_or_init(|| self.hash(DUMMY_PASSWORD).unwrap_or_default());
        let _ = self.verify(password, dummy);
        false
    }

    /// [`hash`](Self::hash) on the blocking pool; the KDF takes tens of milliseconds.
    pub async fn hash_blocking(&self, password: &str) -> Result<String, AppError> {
        let hasher = self.clone();
        let password = password.to_string();

        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AppError::Internal(format!("password hashing task failed: {}", e)))?
    }

    /// [`verify`](Self::verify) on the blocking pool.
    pub async fn verify_blocking(&self, password: &str, hash: &str) -> bool {
        let hasher = self.clone();
        let password = password.to_string();
        let hash = hash.to_string();

        match tokio::task::spawn_blocking(move || hasher.verify(&password, &hash)).await {
            Ok(matched) => matched,
            Err(e) => {
                tracing::error!("Password verification task failed: {}", e);
                false
            }
        }
    }

    /// [`verify_dummy`](Self::verify_dummy) on the blocking pool.
    pub async fn verify_dummy_blocking(&self, password: &str) -> bool {
        let hasher = self.clone();
        let password = password.to_string();

        if let Err(e) = tokio::task::spawn_blocking(move || hasher.verify_dummy(&password)).await {
            tracing::error!("Password verification task failed: {}", e);
        }
        false
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = PasswordHasher::new();
        let password = "password1";

        let hash = hasher.hash(password).unwrap();
        assert!(hasher.verify(password, &hash));
    }

    #[test]
    fn test_verify_fails_with_wrong_password() {
        let hasher = PasswordHasher::new();

        let hash = hasher.hash("password1").unwrap();
        assert!(!hasher.verify("password2", &hash));
        assert!(!hasher.verify("", &hash));
    }

    #[test]
    fn test_hash_encodes_parameters() {
        let hasher = PasswordHasher::new();
        let hash = hasher.hash("password1").unwrap();

        assert!(hash.starts_with("$argon2id$v=19$"));
        assert!(hash.contains("m=65536,t=2,p=1"));
    }

    #[test]
    fn test_hash_is_different_each_time() {
        let hasher = PasswordHasher::new();
        let password = "password1";

        let hash1 = hasher.hash(password).unwrap();
        let hash2 = hasher.hash(password).unwrap();

        // Hashes should be different due to salt
        assert_ne!(hash1, hash2);
        assert!(hasher.verify(password, &hash1));
        assert!(hasher.verify(password, &hash2));
    }

    #[test]
    fn test_verify_hash_with_other_parameters() {
        let params = Params::new(8 * 1024, 1, 1, Some(OUTPUT_LEN)).unwrap();
        let legacy = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let salt = SaltString::generate(&mut OsRng);
        let hash = legacy
            .hash_password(b"password1", &salt)
            .unwrap()
            .to_string();

        let hasher = PasswordHasher::new();
        assert!(hasher.verify("password1", &hash));
        assert!(!hasher.verify("password2", &hash));
    }

    #[test]
    fn test_verify_garbage_hash_is_false() {
        let hasher = PasswordHasher::new();
        assert!(!hasher.verify("password1", "not-a-phc-string"));
        assert!(!hasher.verify("password1", ""));
    }

    #[tokio::test]
    async fn test_blocking_variants() {
        let hasher = PasswordHasher::new();
        let hash = hasher.hash_blocking("password1").await.unwrap();
        assert!(hasher.verify_blocking("password1", &hash).await);
        assert!(!hasher.verify_blocking("password2", &hash).await);
    }

    #[tokio::test]
    async fn test_verify_dummy_always_fails_and_caches_hash() {
        let hasher = PasswordHasher::new();
        assert!(hasher.dummy_hash.get().is_none());

        assert!(!hasher.verify_dummy_blocking(DUMMY_PASSWORD).await);
        assert!(!hasher.verify_dummy("password1"));

        // Clones share the cached hash
        let dummy = hasher.clone().dummy_hash.get().cloned().unwrap();
        assert!(dummy.starts_with("$argon2id$v=19$m=65536,t=2,p=1$"));
    }
}
