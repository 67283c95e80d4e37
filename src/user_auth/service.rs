use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::identity::{IdentityStore, NewIdentity, Role, StoreError, UniqueField, roles_for};
use crate::password::{HashError, PasswordHasher};
use crate::token::{TokenError, TokenIssuer};

/// User Registration Request
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[schema(example = "alice")]
    pub username: String,
    #[schema(example = "alice@x.com")]
    pub email: String,
    #[schema(example = "pw123456")]
    pub password: String,
    #[serde(default, alias = "admin")]
    pub wants_admin: bool,
}

/// User Login Request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "alice")]
    pub username: String,
    #[schema(example = "pw123456")]
    pub password: String,
}

/// Auth Response (JWT)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub username: String,
    pub roles: Vec<Role>,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Username already exists")]
    UsernameTaken,

    #[error("Email already exists")]
    EmailTaken,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Identity store error: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Hashing(#[from] HashError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("Password task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub struct UserAuthService {
    store: Arc<dyn IdentityStore>,
    hasher: PasswordHasher,
    issuer: Arc<TokenIssuer>,
    /// Verified against when the username is unknown, so both failure
    /// paths pay for one Argon2 run.
    dummy_hash: String,
}

impl UserAuthService {
    /// Build the service. Hashes the timing-equalizer password once, so
    /// call it during startup rather than on a request path.
    pub fn new(
        store: Arc<dyn IdentityStore>,
        hasher: PasswordHasher,
        issuer: Arc<TokenIssuer>,
    ) -> Result<Self, AuthError> {
        let dummy_hash = hasher.hash("timing-equalizer")?;
        Ok(Self {
            store,
            hasher,
            issuer,
            dummy_hash,
        })
    }

    pub fn store(&self) -> &Arc<dyn IdentityStore> {
        &self.store
    }

    /// Register a new user
    ///
    /// Username is checked before email, so a request colliding on both
    /// always reports the username.
    pub async fn register(&self, req: SignupRequest) -> Result<AuthResponse, AuthError> {
        tracing::info!("Processing registration for username: {}", req.username);

        // 1. Uniqueness
        if self.store.find_by_username(&req.username).await?.is_some() {
            tracing::info!(
                "Registration failed: Username '{}' already exists",
                req.username
            );
            return Err(AuthError::UsernameTaken);
        }
        if self.store.find_by_email(&req.email).await?.is_some() {
            tracing::info!("Registration failed: Email '{}' already exists", req.email);
            return Err(AuthError::EmailTaken);
        }

        // 2. Hash password
        let hasher = self.hasher.clone();
        let password = req.password;
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password)).await??;

        // 3. Persist; the store re-checks uniqueness atomically
        let identity = self
            .store
            .insert(NewIdentity {
                username: req.username,
                email: req.email,
                password_hash,
                roles: roles_for(req.wants_admin),
            })
            .await
            .map_err(|e| match e {
                StoreError::Duplicate(UniqueField::Username) => AuthError::UsernameTaken,
                StoreError::Duplicate(UniqueField::Email) => AuthError::EmailTaken,
                other => AuthError::Store(other),
            })?;

        tracing::info!("User registered successfully: {}", identity.username);

        // 4. Issue token
        let issued = self.issuer.issue(&identity)?;
        Ok(AuthResponse {
            token: issued.token,
            username: identity.username,
            roles: identity.roles,
            message: "User registered successfully".to_string(),
        })
    }

    /// Login user and issue JWT
    pub async fn login(&self, req: LoginRequest) -> Result<AuthResponse, AuthError> {
        tracing::info!("Processing login for username: {}", req.username);

        let identity = self.store.find_by_username(&req.username).await?;
        let stored_hash = match &identity {
            Some(identity) => identity.password_hash.clone(),
            None => self.dummy_hash.clone(),
        };

        let hasher = self.hasher.clone();
        let password = req.password;
        let password_ok =
            tokio::task::spawn_blocking(move || hasher.verify(&password, &stored_hash)).await?;

        let identity = match identity {
            Some(identity) if password_ok => identity,
            _ => {
                tracing::info!("Login failed: Invalid username or password");
                return Err(AuthError::InvalidCredentials);
            }
        };

        tracing::info!("User logged in successfully: {}", identity.username);

        let issued = self.issuer.issue(&identity)?;
        Ok(AuthResponse {
            token: issued.token,
            username: identity.username,
            roles: identity.roles,
            message: "Login successful".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TokenConfig;
    use crate::identity::InMemoryIdentityStore;
    use crate::test_support::shared_keys;

    fn service() -> UserAuthService {
        let issuer = Arc::new(TokenIssuer::new(shared_keys(), &TokenConfig::default()));
        UserAuthService::new(
            Arc::new(InMemoryIdentityStore::new()),
            PasswordHasher::new(),
            issuer,
        )
        .unwrap()
    }

    fn signup(username: &str, email: &str, wants_admin: bool) -> SignupRequest {
        SignupRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: "pw123456".to_string(),
            wants_admin,
        }
    }

    fn login(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_stores_hash_not_password() {
        let svc = service();
        let resp = svc
            .register(signup("alice", "alice@x.com", false))
            .await
            .unwrap();
        assert_eq!(resp.username, "alice");
        assert_eq!(resp.roles, vec![Role::User]);
        assert_eq!(resp.message, "User registered successfully");
        assert!(!resp.token.is_empty());

        let stored = svc.store().find_by_username("alice").await.unwrap().unwrap();
        assert_ne!(stored.password_hash, "pw123456");
        assert!(PasswordHasher::new().verify("pw123456", &stored.password_hash));
    }

    #[tokio::test]
    async fn test_register_admin_gets_both_roles() {
        let svc = service();
        let resp = svc
            .register(signup("root", "root@x.com", true))
            .await
            .unwrap();
        assert_eq!(resp.roles, vec![Role::User, Role::Admin]);
    }

    #[tokio::test]
    async fn test_username_conflict_wins_over_email_conflict() {
        let svc = service();
        svc.register(signup("alice", "alice@x.com", false))
            .await
            .unwrap();

        // Same username, same email
        let err = svc
            .register(signup("alice", "alice@x.com", false))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UsernameTaken));

        // Same username, different email
        let err = svc
            .register(signup("alice", "other@x.com", false))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UsernameTaken));

        // Different username, same email
        let err = svc
            .register(signup("alice2", "alice@x.com", false))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken));
        assert_eq!(err.to_string(), "Email already exists");

        assert_eq!(svc.store().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let svc = service();
        svc.register(signup("alice", "alice@x.com", false))
            .await
            .unwrap();

        let wrong_password = svc.login(login("alice", "wrong")).await.unwrap_err();
        let unknown_user = svc.login(login("nobody", "pw123456")).await.unwrap_err();

        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
        assert!(matches!(unknown_user, AuthError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
        assert_eq!(wrong_password.to_string(), "Invalid username or password");
    }

    #[tokio::test]
    async fn test_unknown_user_is_checked_against_real_argon2_record() {
        let svc = service();
        // Ready before the first request, and parseable so verify pays full cost
        assert!(svc.dummy_hash.starts_with("$argon2id$"));
        assert!(argon2::PasswordHash::new(&svc.dummy_hash).is_ok());

        let err = svc.login(login("ghost", "timing-equalizer")).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_login_success() {
        let svc = service();
        svc.register(signup("alice", "alice@x.com", false))
            .await
            .unwrap();

        let resp = svc.login(login("alice", "pw123456")).await.unwrap();
        assert_eq!(resp.username, "alice");
        assert_eq!(resp.roles, vec![Role::User]);
        assert_eq!(resp.message, "Login successful");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_duplicate_registration_single_winner() {
        let svc = Arc::new(service());
        let mut handles = Vec::new();
        for i in 0..8 {
            let svc = svc.clone();
            handles.push(tokio::spawn(async move {
                svc.register(signup("race", &format!("race{}@x.com", i), false))
                    .await
            }));
        }

        let mut created = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(AuthError::UsernameTaken) => {}
                Err(e) => panic!("unexpected error: {:?}", e),
            }
        }
        assert_eq!(created, 1);
        assert_eq!(svc.store().count().await.unwrap(), 1);
    }

    #[test]
    fn test_signup_request_wire_format() {
        let req: SignupRequest = serde_json::from_str(
            r#"{"username":"alice","email":"alice@x.com","password":"pw","wantsAdmin":true}"#,
        )
        .unwrap();
        assert!(req.wants_admin);

        let req: SignupRequest =
            serde_json::from_str(r#"{"username":"a","email":"a@x.com","password":"pw"}"#)
                .unwrap();
        assert!(!req.wants_admin);
    }
}
