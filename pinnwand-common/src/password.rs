//! Argon2id password hashing for the user resource.
//!
//! Hashes are PHC-format strings and live only in the database layer;
//! they never appear in API responses.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

#[derive(Copy, Clone, Eq, PartialEq, Debug, Error)]
#[error("Hashing password failed: {0}")]
pub struct PasswordHashError(argon2::password_hash::Error);

/// Hash a password with a freshly generated salt, returning a PHC string.
pub fn hash_password(password: &str) -> Result<String, PasswordHashError> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(PasswordHashError)?;

    Ok(hash.to_string())
}

/// Check a password against a stored PHC string. `Ok(false)` means the
/// password did not match; `Err` means the stored hash is malformed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordHashError> {
    let parsed = PasswordHash::new(hash).map_err(PasswordHashError)?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(error) => Err(PasswordHashError(error)),
    }
}

#[cfg(test)]
mod tests {
    use crate::password::{hash_password, verify_password};

    #[test]
    fn hash_verifies_original_password() {
        let hash = hash_password("password123").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("password123", &hash).unwrap());
        assert!(!verify_password("different", &hash).unwrap());
    }

    #[test]
    fn salts_differ_between_hashes() {
        let first = hash_password("password123").unwrap();
        let second = hash_password("password123").unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(verify_password("password123", "not a phc string").is_err());
    }
}
