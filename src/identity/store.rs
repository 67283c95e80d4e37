//! Identity storage abstraction
//!
//! Uniqueness of `username` and `email` is a property of the store, not of
//! its callers: `insert` must fail with [`StoreError::Duplicate`] when either
//! value is already taken, atomically with the write. Services may check
//! first for a friendlier error, but two concurrent inserts of the same
//! username must never both succeed.

use async_trait::async_trait;
use thiserror::Error;

use super::models::{Identity, NewIdentity};

/// Column whose uniqueness constraint rejected an insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Username,
    Email,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Duplicate {0:?}")]
    Duplicate(UniqueField),

    #[error("Identity must have at least one role")]
    NoRoles,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Corrupt identity record: {0}")]
    Corrupt(String),
}

#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<Identity>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, StoreError>;

    /// Persist a new identity, enforcing username and email uniqueness.
    async fn insert(&self, identity: NewIdentity) -> Result<Identity, StoreError>;

    async fn count(&self) -> Result<u64, StoreError>;
}
