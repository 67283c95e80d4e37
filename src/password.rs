//! One-way password hashing.
//!
//! Hashes are Argon2id PHC strings (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`)
//! so the salt and cost parameters travel with the record and verification
//! never needs out-of-band configuration.

use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("Password hashing failed: {0}")]
pub struct HashError(String);

/// Salted Argon2id hasher with the crate's default (fixed) work factor.
#[derive(Clone, Default)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash `plaintext` with a freshly generated salt.
    pub fn hash(&self, plaintext: &str) -> Result<String, HashError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| HashError(e.to_string()))
    }

    /// Check `plaintext` against a stored PHC record.
    ///
    /// A record that does not parse counts as a mismatch.
    pub fn verify(&self, plaintext: &str, hash_record: &str) -> bool {
        let parsed = match PasswordHash::new(hash_record) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Rejecting malformed password hash record: {}", e);
                return false;
            }
        };

        // Output comparison inside password-hash is constant-time
        self.argon2
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }
}
