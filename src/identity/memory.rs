//! In-process identity store.
//!
//! Both unique indexes live behind one lock so the existence check and the
//! write happen in the same critical section.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use super::models::{Identity, IdentityId, NewIdentity};
use super::store::{IdentityStore, StoreError, UniqueField};

#[derive(Default)]
struct Inner {
    next_id: IdentityId,
    by_id: HashMap<IdentityId, Identity>,
    by_username: HashMap<String, IdentityId>,
    by_email: HashMap<String, IdentityId>,
}

impl Inner {
    fn lookup(&self, index: &HashMap<String, IdentityId>, key: &str) -> Option<Identity> {
        index.get(key).and_then(|id| self.by_id.get(id)).cloned()
    }
}

#[derive(Default)]
pub struct InMemoryIdentityStore {
    inner: RwLock<Inner>,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
        // A panic while holding the lock cannot leave the maps half-updated:
        // insert only mutates after every check has passed.
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Inner> {
        self.inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<Identity>, StoreError> {
        let inner = self.read();
        Ok(inner.lookup(&inner.by_username, username))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, StoreError> {
        let inner = self.read();
        Ok(inner.lookup(&inner.by_email, email))
    }

    async fn insert(&self, new: NewIdentity) -> Result<Identity, StoreError> {
        if new.roles.is_empty() {
            return Err(StoreError::NoRoles);
        }

        let mut inner = self.write();
        if inner.by_username.contains_key(&new.username) {
            return Err(StoreError::Duplicate(UniqueField::Username));
        }
        if inner.by_email.contains_key(&new.email) {
            return Err(StoreError::Duplicate(UniqueField::Email));
        }

        inner.next_id += 1;
        let identity = Identity {
            id: inner.next_id,
            username: new.username,
            email: new.email,
            password_hash: new.password_hash,
            roles: dedup_roles(new.roles),
            created_at: Utc::now(),
        };
        inner
            .by_username
            .insert(identity.username.clone(), identity.id);
        inner.by_email.insert(identity.email.clone(), identity.id);
        inner.by_id.insert(identity.id, identity.clone());
        Ok(identity)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.read().by_id.len() as u64)
    }
}

pub(crate) fn dedup_roles(roles: Vec<super::Role>) -> Vec<super::Role> {
    let mut out = Vec::with_capacity(roles.len());
    for role in roles {
        if !out.contains(&role) {
            out.push(role);
        }
    }
    out
}
