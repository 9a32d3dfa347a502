//! Argon2id password hashing.
//!
//! Hashes are PHC strings, so parameters travel with the hash and can be
//! raised later without invalidating existing credentials.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Hash a password with a fresh random salt.
///
/// Argon2 is deliberately slow; call this from a blocking context
/// (`tokio::task::spawn_blocking`) inside request handlers.
pub fn hash(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// Verify a password against a stored PHC hash. An unparseable hash counts
/// as a failed verification rather than an error the caller must handle.
pub fn verify(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        tracing::error!("Stored password hash is not a valid PHC string");
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_verifies_and_uses_argon2id() {
        let hashed = hash("correct horse battery staple").expect("hash");
        assert!(hashed.starts_with("$argon2id$"));
        assert!(verify("correct horse battery staple", &hashed));
    }

    #[test]
    fn wrong_password_fails() {
        let hashed = hash("correct horse battery staple").expect("hash");
        assert!(!verify("Tr0ub4dor&3", &hashed));
    }

    #[test]
    fn salts_are_unique_per_hash() {
        let a = hash("same input").expect("hash");
        let b = hash("same input").expect("hash");
        assert_ne!(a, b);
    }

    #[test]
    fn corrupt_stored_hash_fails_closed() {
        assert!(!verify("anything", "not-a-phc-string"));
    }
}
