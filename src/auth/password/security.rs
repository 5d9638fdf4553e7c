//! Credential hashing for the in-memory identity backend.
//!
//! Hashes are PHC strings produced by Argon2id, so verification can recover
//! the salt and parameters from the stored value.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    HashingError(String),

    #[error("Failed to verify password: {0}")]
    VerificationError(String),
}

/// Service for password hashing operations
pub struct PasswordService;

impl PasswordService {
    /// Hash a password using Argon2id with a fresh random salt
    pub fn hash_password(password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::HashingError(e.to_string()))
    }

    /// Verify a password against a previously generated hash
    pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| PasswordError::VerificationError(e.to_string()))?;

        Ok(Argon2::default().verify_password(password.as_bytes(), &parsed_hash).is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_and_verify() {
        let password = "Sprocket#42";

        let hash = PasswordService::hash_password(password).expect("Failed to hash password");
        assert_ne!(hash, password);

        let is_valid =
            PasswordService::verify_password(password, &hash).expect("Failed to verify password");
        assert!(is_valid, "Password verification should succeed");

        let is_valid = PasswordService::verify_password("Sprocket#43", &hash)
            .expect("Failed to verify password");
        assert!(!is_valid, "Wrong password verification should fail");
    }

    #[test]
    fn test_same_password_gets_distinct_salts() {
        let first = PasswordService::hash_password("Derailleur!9").unwrap();
        let second = PasswordService::hash_password("Derailleur!9").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        let result = PasswordService::verify_password("anything", "not-a-phc-string");
        assert!(matches!(result, Err(PasswordError::VerificationError(_))));
    }
}
