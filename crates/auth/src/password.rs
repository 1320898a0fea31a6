//! Password hashing and verification (Argon2id, PHC string format).
//!
//! Both functions are CPU-bound; async callers should run them on a blocking thread.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PasswordError {
    #[error("failed to hash password: {0}")]
    Hash(String),

    #[error("stored password hash is malformed: {0}")]
    MalformedHash(String),
}

/// Hash a password with a fresh random salt. Returns a PHC-format string.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::Hash(e.to_string()))?;
    Ok(hash.to_string())
}

/// `Ok(false)` on mismatch; `Err` only when `hash` is not a valid PHC string.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(hash).map_err(|e| PasswordError::MalformedHash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("s3cret-pass").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert_eq!(verify_password("s3cret-pass", &hash), Ok(true));
        assert_eq!(verify_password("wrong-pass", &hash), Ok(false));
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        assert_ne!(hash_password("s3cret-pass").unwrap(), hash_password("s3cret-pass").unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(matches!(
            verify_password("whatever", "plaintext"),
            Err(PasswordError::MalformedHash(_))
        ));
    }
}
