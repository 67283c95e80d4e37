//! Bookshelf Auth - service entry point
//!
//! Startup order:
//!
//! ```text
//! ┌──────────┐    ┌──────────┐    ┌──────────┐    ┌──────────┐    ┌──────────┐
//! │  Config  │───▶│ Logging  │───▶│   Keys   │───▶│ Identity │───▶│ Gateway  │
//! │  (YAML)  │    │          │    │(load/gen)│    │ + seed   │    │  (HTTP)  │
//! └──────────┘    └──────────┘    └──────────┘    └──────────┘    └──────────┘
//! ```
//!
//! A key failure aborts startup before the listener is bound.

use std::sync::Arc;

use anyhow::Context;

use bookshelf_auth::authz::AuthorizationGate;
use bookshelf_auth::bootstrap::seed_default_identities;
use bookshelf_auth::config::AppConfig;
use bookshelf_auth::db::Database;
use bookshelf_auth::gateway::{self, state::AppState};
use bookshelf_auth::identity::{IdentityStore, InMemoryIdentityStore, PgIdentityStore};
use bookshelf_auth::keys::KeyManager;
use bookshelf_auth::password::PasswordHasher;
use bookshelf_auth::token::TokenIssuer;
use bookshelf_auth::user_auth::UserAuthService;

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let mut app_config = AppConfig::load(&env)?;
    if let Some(port) = get_port_override() {
        app_config.gateway.port = port;
    }
    let _log_guard = bookshelf_auth::logging::init_logging(&app_config);

    tracing::info!("Starting Bookshelf Auth in {} mode", env);

    // Signing keys: fatal on any failure
    let key_config = app_config.keys.clone();
    let keys = tokio::task::spawn_blocking(move || KeyManager::init(&key_config))
        .await
        .context("Key initialization task panicked")?
        .map_err(|e| {
            tracing::error!("Failed to initialize RSA keys: {}", e);
            e
        })
        .context("Failed to initialize RSA keys")?;
    tracing::info!("Signing keys ready ({:?})", keys.origin());
    let keys = Arc::new(keys);

    // Identity store
    let (store, pg_db): (Arc<dyn IdentityStore>, Option<Arc<Database>>) =
        match &app_config.postgres_url {
            Some(url) => {
                let db = Arc::new(
                    Database::connect(url)
                        .await
                        .context("Failed to connect to PostgreSQL")?,
                );
                let store = PgIdentityStore::new(db.clone());
                store
                    .init_schema()
                    .await
                    .context("Failed to initialize identities schema")?;
                (Arc::new(store), Some(db))
            }
            None => {
                tracing::warn!("postgres_url not set, identities are kept in memory only");
                (Arc::new(InMemoryIdentityStore::new()), None)
            }
        };

    let hasher = PasswordHasher::new();
    seed_default_identities(store.as_ref(), &hasher).await?;

    let issuer = Arc::new(TokenIssuer::new(keys.clone(), &app_config.token));
    let gate = Arc::new(AuthorizationGate::new(keys, &app_config.token));
    let user_auth = Arc::new(
        UserAuthService::new(store, hasher, issuer)
            .context("Failed to initialize authentication service")?,
    );

    let state = Arc::new(AppState::new(user_auth, gate, pg_db));
    gateway::run_server(&app_config.gateway, state).await
}
