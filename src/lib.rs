//! Bookshelf Auth - credential issuance and validation
//!
//! # Modules
//!
//! - [`password`] - Argon2id hashing and verification
//! - [`keys`] - RSA signing key pair, loaded or generated at startup
//! - [`identity`] - Identity records and stores (in-memory, PostgreSQL)
//! - [`token`] - RS256 JWT issuance
//! - [`authz`] - Token validation and role checks
//! - [`user_auth`] - Registration, login and their HTTP handlers
//! - [`bootstrap`] - Default account seeding on an empty store
//! - [`gateway`] - Axum router, shared state and error responses
//! - [`config`] / [`logging`] - YAML configuration and tracing setup

pub mod config;
pub mod db;
pub mod logging;

// Credential core
pub mod authz;
pub mod bootstrap;
pub mod identity;
pub mod keys;
pub mod password;
pub mod token;

// HTTP surface
pub mod gateway;
pub mod user_auth;

#[cfg(test)]
mod test_support;

// Convenient re-exports at crate root
pub use authz::{AuthorizationGate, Decision, DenyReason};
pub use bootstrap::{SeedOutcome, seed_default_identities};
pub use identity::{Identity, IdentityStore, InMemoryIdentityStore, PgIdentityStore, Role};
pub use keys::{KeyError, KeyManager, KeyOrigin};
pub use password::PasswordHasher;
pub use token::{Claims, IssuedToken, TokenIssuer};
pub use user_auth::{AuthError, UserAuthService};
