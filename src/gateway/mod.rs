pub mod error;
pub mod handlers;
pub mod openapi;
pub mod state;

use axum::{
    Json, Router,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use utoipa::OpenApi;

use crate::config::GatewayConfig;
use crate::user_auth::handlers as auth_handlers;
use state::AppState;

/// Build the HTTP router.
///
/// Signup, login and health are public. The probe and `me` handlers run
/// their own authorization check at entry, so no auth layer is applied here.
pub fn router(state: Arc<AppState>) -> Router {
    let auth_routes = Router::new()
        .route("/signup", post(auth_handlers::signup))
        .route("/login", post(auth_handlers::login))
        .route("/admin", get(auth_handlers::admin_probe))
        .route("/user", get(auth_handlers::user_probe))
        .route("/me", get(auth_handlers::me));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/auth", auth_routes)
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(openapi::ApiDoc::openapi()) }),
        )
        .with_state(state)
}

/// Start HTTP Gateway server
pub async fn run_server(config: &GatewayConfig, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        tracing::error!(
            "Failed to bind to {}: {} (port {} may already be in use)",
            addr,
            e,
            config.port
        );
        anyhow::anyhow!("Failed to bind to {}: {}", addr, e)
    })?;

    tracing::info!("Gateway listening on http://{}", addr);
    tracing::info!("API Docs: http://{}/api-docs/openapi.json", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
