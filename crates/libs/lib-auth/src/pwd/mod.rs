//! # Password Hashing
//!
//! Salted one-way password hashing and verification using Argon2.
//! Hashes are stored as PHC strings, so the salt and parameters travel with them.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Password hashing errors.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("Password must be at least {MIN_PASSWORD_LEN} characters long")]
    TooShort,
    #[error("Failed to hash password: {0}")]
    Hash(String),
    #[error("Failed to parse hash: {0}")]
    InvalidHash(String),
}

/// Hash a password using the Argon2 algorithm with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, Error> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::TooShort);
    }

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| Error::Hash(e.to_string()))?
        .to_string();

    Ok(password_hash)
}

/// Verify a plaintext password against an Argon2 hash.
///
/// Returns `Ok(false)` on mismatch; `Err` only when the stored hash is unreadable.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, Error> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e| Error::InvalidHash(e.to_string()))?;

    let argon2 = Argon2::default();

    Ok(argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hashing() {
        let password = "TestPassword123!";
        let hash = hash_password(password)
            .expect("Password hashing should succeed for valid password");

        assert!(verify_password(password, &hash)
            .expect("Password verification should succeed for correct password"));
        assert!(!verify_password("WrongPassword", &hash)
            .expect("Password verification should fail for incorrect password"));
    }

    #[test]
    fn test_hash_is_salted() {
        let first = hash_password("SamePassword1").expect("hash");
        let second = hash_password("SamePassword1").expect("hash");

        assert_ne!(first, second);
        assert!(!first.contains("SamePassword1"));
    }

    #[test]
    fn test_password_too_short() {
        let result = hash_password("short");

        assert_eq!(result.expect_err("Hash should fail for short password"), Error::TooShort);
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(matches!(
            verify_password("whatever", "not-a-phc-string"),
            Err(Error::InvalidHash(_))
        ));
    }
}
