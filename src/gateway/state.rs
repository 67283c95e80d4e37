use std::sync::Arc;

use crate::authz::AuthorizationGate;
use crate::db::Database;
use crate::user_auth::UserAuthService;

/// Shared gateway state
#[derive(Clone)]
pub struct AppState {
    /// Registration and login
    pub user_auth: Arc<UserAuthService>,
    /// Bearer token checks for role-gated routes
    pub gate: Arc<AuthorizationGate>,
    /// PostgreSQL pool backing the identity store, if configured
    pub pg_db: Option<Arc<Database>>,
}

impl AppState {
    pub fn new(
        user_auth: Arc<UserAuthService>,
        gate: Arc<AuthorizationGate>,
        pg_db: Option<Arc<Database>>,
    ) -> Self {
        Self {
            user_auth,
            gate,
            pg_db,
        }
    }
}
