//! Identity records and roles

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Store-assigned identifier.
pub type IdentityId = i64;

/// Capability grouping carried in tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(Role::User),
            "ADMIN" => Ok(Role::Admin),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Identity as persisted by an [`IdentityStore`](super::IdentityStore).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: IdentityId,
    pub username: String,
    pub email: String,
    /// PHC string; never plaintext
    pub password_hash: String,
    /// Non-empty, deduplicated, in insertion order
    pub roles: Vec<Role>,
    pub created_at: DateTime<Utc>,
}

/// Insert request for a new identity. The store assigns `id` and `created_at`.
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub roles: Vec<Role>,
}

/// Build the role set for a new identity: USER always, ADMIN on request.
pub fn roles_for(wants_admin: bool) -> Vec<Role> {
    if wants_admin {
        vec![Role::User, Role::Admin]
    } else {
        vec![Role::User]
    }
}
