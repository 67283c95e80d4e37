//! User authentication
//!
//! - `service`: registration and login over the identity store
//! - `handlers`: HTTP endpoints under `/auth`
//! - `guard`: bearer extraction and per-handler role checks

pub mod guard;
pub mod handlers;
pub mod service;

pub use guard::{authorize_request, bearer_token};
pub use service::{AuthError, AuthResponse, LoginRequest, SignupRequest, UserAuthService};
