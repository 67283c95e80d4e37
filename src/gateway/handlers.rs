//! Gateway-level handlers that are not part of user authentication

pub mod health;

pub use health::{HealthResponse, health_check};
