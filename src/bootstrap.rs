//! First-start account seeding.
//!
//! When the identity store is empty two accounts are created:
//!
//! | username | password   | roles       |
//! |----------|------------|-------------|
//! | `admin`  | `admin123` | ADMIN, USER |
//! | `user`   | `user123`  | USER        |
//!
//! These credentials exist only for initial access; operators are expected
//! to replace them. Seeding looks at the persisted identity count, so it
//! runs at most once per store no matter how often the process restarts.

use anyhow::{Context, Result};

use crate::identity::{IdentityStore, NewIdentity, Role, StoreError};
use crate::password::PasswordHasher;

pub struct DefaultAccount {
    pub username: &'static str,
    pub email: &'static str,
    pub password: &'static str,
    pub roles: &'static [Role],
}

pub const DEFAULT_ACCOUNTS: [DefaultAccount; 2] = [
    DefaultAccount {
        username: "admin",
        email: "admin@example.com",
        password: "admin123",
        roles: &[Role::Admin, Role::User],
    },
    DefaultAccount {
        username: "user",
        email: "user@example.com",
        password: "user123",
        roles: &[Role::User],
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Seeded(usize),
    AlreadyPopulated,
}

pub async fn seed_default_identities(
    store: &dyn IdentityStore,
    hasher: &PasswordHasher,
) -> Result<SeedOutcome> {
    let existing = store
        .count()
        .await
        .context("Failed to count identities")?;
    if existing > 0 {
        tracing::info!(
            "Identity store holds {} identities, skipping default users",
            existing
        );
        return Ok(SeedOutcome::AlreadyPopulated);
    }

    tracing::info!("Initializing identity store with default users");
    let mut created = 0;
    for account in &DEFAULT_ACCOUNTS {
        let password_hash = hasher
            .hash(account.password)
            .with_context(|| format!("Failed to hash default password for {}", account.username))?;

        let new = NewIdentity {
            username: account.username.to_string(),
            email: account.email.to_string(),
            password_hash,
            roles: account.roles.to_vec(),
        };
        match store.insert(new).await {
            Ok(_) => created += 1,
            // Another instance seeded between our count and insert
            Err(StoreError::Duplicate(field)) => {
                tracing::warn!(
                    "Default user {} already present ({:?}), leaving it untouched",
                    account.username,
                    field
                );
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to create default user {}", account.username));
            }
        }
    }

    if created == 0 {
        return Ok(SeedOutcome::AlreadyPopulated);
    }
    tracing::info!("Default users created successfully");
    Ok(SeedOutcome::Seeded(created))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{Identity, InMemoryIdentityStore};
    use async_trait::async_trait;

    /// Reports an empty store regardless of contents, as seen by an instance
    /// whose count ran before a concurrent seeder's inserts landed.
    struct StaleCountStore(InMemoryIdentityStore);

    #[async_trait]
    impl IdentityStore for StaleCountStore {
        async fn find_by_username(&self, username: &str) -> Result<Option<Identity>, StoreError> {
            self.0.find_by_username(username).await
        }

        async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, StoreError> {
            self.0.find_by_email(email).await
        }

        async fn insert(&self, identity: NewIdentity) -> Result<Identity, StoreError> {
            self.0.insert(identity).await
        }

        async fn count(&self) -> Result<u64, StoreError> {
            Ok(0)
        }
    }

    async fn insert_default(store: &InMemoryIdentityStore, hasher: &PasswordHasher, idx: usize) {
        let account = &DEFAULT_ACCOUNTS[idx];
        store
            .insert(NewIdentity {
                username: account.username.to_string(),
                email: account.email.to_string(),
                password_hash: hasher.hash(account.password).unwrap(),
                roles: account.roles.to_vec(),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_seed_twice_creates_two_identities() {
        let store = InMemoryIdentityStore::new();
        let hasher = PasswordHasher::new();

        let first = seed_default_identities(&store, &hasher).await.unwrap();
        assert_eq!(first, SeedOutcome::Seeded(2));
        let second = seed_default_identities(&store, &hasher).await.unwrap();
        assert_eq!(second, SeedOutcome::AlreadyPopulated);

        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_seeder_partial_overlap() {
        let hasher = PasswordHasher::new();
        let inner = InMemoryIdentityStore::new();
        insert_default(&inner, &hasher, 0).await;
        let store = StaleCountStore(inner);

        let outcome = seed_default_identities(&store, &hasher).await.unwrap();
        assert_eq!(outcome, SeedOutcome::Seeded(1));
        assert_eq!(store.0.count().await.unwrap(), 2);
        assert!(store.0.find_by_username("user").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_concurrent_seeder_already_finished() {
        let hasher = PasswordHasher::new();
        let inner = InMemoryIdentityStore::new();
        insert_default(&inner, &hasher, 0).await;
        insert_default(&inner, &hasher, 1).await;
        let store = StaleCountStore(inner);

        let outcome = seed_default_identities(&store, &hasher).await.unwrap();
        assert_eq!(outcome, SeedOutcome::AlreadyPopulated);
        assert_eq!(store.0.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_seeded_accounts_have_expected_roles_and_passwords() {
        let store = InMemoryIdentityStore::new();
        let hasher = PasswordHasher::new();
        seed_default_identities(&store, &hasher).await.unwrap();

        let admin = store.find_by_username("admin").await.unwrap().unwrap();
        assert_eq!(admin.roles, vec![Role::Admin, Role::User]);
        assert!(hasher.verify("admin123", &admin.password_hash));

        let user = store.find_by_username("user").await.unwrap().unwrap();
        assert_eq!(user.roles, vec![Role::User]);
        assert!(hasher.verify("user123", &user.password_hash));
        assert!(!hasher.verify("admin123", &user.password_hash));
    }

    #[tokio::test]
    async fn test_non_empty_store_is_left_alone() {
        let store = InMemoryIdentityStore::new();
        let hasher = PasswordHasher::new();
        store
            .insert(NewIdentity {
                username: "alice".into(),
                email: "alice@x.com".into(),
                password_hash: hasher.hash("pw123456").unwrap(),
                roles: vec![Role::User],
            })
            .await
            .unwrap();

        let outcome = seed_default_identities(&store, &hasher).await.unwrap();
        assert_eq!(outcome, SeedOutcome::AlreadyPopulated);
        assert_eq!(store.count().await.unwrap(), 1);
        assert!(store.find_by_username("admin").await.unwrap().is_none());
    }
}
