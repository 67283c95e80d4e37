//! Identity storage
//!
//! - `models`: Identity, Role and insert types
//! - `store`: `IdentityStore` trait and error types
//! - `memory`: lock-guarded in-process store
//! - `postgres`: PostgreSQL store with UNIQUE constraints

pub mod memory;
pub mod models;
pub mod postgres;
pub mod store;

pub use memory::InMemoryIdentityStore;
pub use models::{Identity, IdentityId, NewIdentity, Role, roles_for};
pub use postgres::PgIdentityStore;
pub use store::{IdentityStore, StoreError, UniqueField};
