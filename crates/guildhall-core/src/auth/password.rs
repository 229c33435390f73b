//! ============================================================================
//! Password Hashing - Argon2id with per-password random salts
//! ============================================================================
//! Hashes are stored as PHC strings, which embed algorithm, parameters and
//! salt, so verification needs nothing but the stored string.
//! ============================================================================

use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;
use once_cell::sync::Lazy;

use crate::error::{ShopError, ShopResult};

/// Hash checked when a login names an unknown user, so both failure paths
/// cost one Argon2 verification.
static DUMMY_HASH: Lazy<String> =
    Lazy::new(|| hash_password("guildhall-dummy-password").unwrap_or_default());

/// Hash a password with a fresh random salt
pub fn hash_password(password: &str) -> ShopResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ShopError::PasswordHash(e.to_string()))
}

/// Check a password against a stored PHC string
pub fn verify_password(password: &str, stored_hash: &str) -> ShopResult<bool> {
    let parsed =
        PasswordHash::new(stored_hash).map_err(|e| ShopError::PasswordHash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Spend the same work as a real verification; the result is discarded
pub fn verify_against_dummy(password: &str) {
    let _ = verify_password(password, &DUMMY_HASH);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("hunter2").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("hunter2", &hash).unwrap());
        assert!(!verify_password("hunter3", &hash).unwrap());
    }

    #[test]
    fn test_same_password_different_salts() {
        let a = hash_password("same").unwrap();
        let b = hash_password("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        assert!(matches!(
            verify_password("x", "not-a-phc-string"),
            Err(ShopError::PasswordHash(_))
        ));
    }

    #[test]
    fn test_dummy_hash_is_valid_phc() {
        assert!(PasswordHash::new(&DUMMY_HASH).is_ok());
    }
}
