//! Bearer token issuance.
//!
//! Tokens are RS256 JWTs signed with the [`KeyManager`] private key. The
//! claim set is shared with [`crate::authz`], which does all verification.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::TokenConfig;
use crate::identity::{Identity, Role};
use crate::keys::{KeyError, KeyManager};

/// Lifetime of every issued token. Not configurable.
pub const TOKEN_TTL: Duration = Duration::hours(24);

/// JWT claim set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Issuer
    pub iss: String,
    /// Subject (username)
    pub sub: String,
    /// Secondary identifier (email)
    pub upn: String,
    /// Roles
    pub groups: Vec<Role>,
    pub full_name: String,
    pub email: String,
    /// Issued at, seconds since epoch
    pub iat: i64,
    /// Expiry, seconds since epoch
    pub exp: i64,
}

impl Claims {
    pub fn has_role(&self, role: Role) -> bool {
        self.groups.contains(&role)
    }
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

#[derive(Debug, Error)]
#[error("Failed to generate token: {0}")]
pub struct TokenError(#[from] KeyError);

pub struct TokenIssuer {
    keys: Arc<KeyManager>,
    issuer: String,
}

impl TokenIssuer {
    pub fn new(keys: Arc<KeyManager>, config: &TokenConfig) -> Self {
        Self {
            keys,
            issuer: config.issuer.clone(),
        }
    }

    pub fn issue(&self, identity: &Identity) -> Result<IssuedToken, TokenError> {
        self.issue_at(identity, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(
        &self,
        identity: &Identity,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        let iat = now.timestamp();
        let claims = Claims {
            iss: self.issuer.clone(),
            sub: identity.username.clone(),
            upn: identity.email.clone(),
            groups: identity.roles.clone(),
            full_name: identity.username.clone(),
            email: identity.email.clone(),
            iat,
            exp: iat + TOKEN_TTL.num_seconds(),
        };

        let token = self.keys.sign(&claims)?;

        Ok(IssuedToken { token, claims })
    }
}
