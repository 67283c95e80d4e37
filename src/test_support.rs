//! Shared fixtures for unit tests.
//!
//! RSA-2048 generation is the slow part of every auth test, so one key pair
//! is generated per test binary and reused.

use std::sync::{Arc, OnceLock};

use chrono::Utc;
use tempfile::TempDir;

use crate::config::KeyConfig;
use crate::identity::{Identity, Role};
use crate::keys::KeyManager;

pub(crate) fn shared_keys() -> Arc<KeyManager> {
    static KEYS: OnceLock<(TempDir, Arc<KeyManager>)> = OnceLock::new();
    KEYS.get_or_init(|| {
        let dir = TempDir::new().expect("tempdir");
        let config = KeyConfig {
            private_key_path: dir.path().join("privateKey.pem").display().to_string(),
            public_key_path: dir.path().join("publicKey.pem").display().to_string(),
        };
        let keys = KeyManager::init(&config).expect("key generation");
        (dir, Arc::new(keys))
    })
    .1
    .clone()
}

pub(crate) fn sample_identity(username: &str, roles: &[Role]) -> Identity {
    Identity {
        id: 1,
        username: username.to_string(),
        email: format!("{}@example.com", username),
        password_hash: "$argon2id$stub".to_string(),
        roles: roles.to_vec(),
        created_at: Utc::now(),
    }
}
