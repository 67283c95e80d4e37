use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use super::guard::authorize_request;
use super::service::{AuthResponse, LoginRequest, SignupRequest};
use crate::gateway::error::{ApiError, MessageResponse};
use crate::gateway::state::AppState;
use crate::identity::Role;

/// Register a new user
///
/// POST /auth/signup
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User registered successfully", body = AuthResponse),
        (status = 400, description = "Missing or malformed field", body = MessageResponse),
        (status = 409, description = "Username or email already exists", body = MessageResponse)
    ),
    tag = "Auth"
)]
pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    tracing::info!("New user signup request received");

    // Basic shape checks; anything deeper belongs to the caller
    if req.username.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("Username and password are required"));
    }
    if !looks_like_email(&req.email) {
        return Err(ApiError::bad_request("A valid email is required"));
    }

    let resp = state.user_auth.register(req).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

/// Login user
///
/// POST /auth/login
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid username or password", body = MessageResponse)
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    tracing::info!("User login request received");
    let resp = state.user_auth.login(req).await?;
    Ok(Json(resp))
}

/// ADMIN-gated probe
///
/// GET /auth/admin
#[utoipa::path(
    get,
    path = "/auth/admin",
    responses(
        (status = 200, description = "Token carries ADMIN", body = MessageResponse),
        (status = 401, description = "Missing, invalid or expired token", body = MessageResponse),
        (status = 403, description = "Token lacks ADMIN", body = MessageResponse)
    ),
    security(("bearer_jwt" = [])),
    tag = "Auth"
)]
pub async fn admin_probe(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<MessageResponse>, ApiError> {
    authorize_request(&state.gate, &headers, Some(Role::Admin))?;
    Ok(Json(MessageResponse::new("Admin access confirmed")))
}

/// USER-gated probe
///
/// GET /auth/user
#[utoipa::path(
    get,
    path = "/auth/user",
    responses(
        (status = 200, description = "Token carries USER", body = MessageResponse),
        (status = 401, description = "Missing, invalid or expired token", body = MessageResponse),
        (status = 403, description = "Token lacks USER", body = MessageResponse)
    ),
    security(("bearer_jwt" = [])),
    tag = "Auth"
)]
pub async fn user_probe(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<MessageResponse>, ApiError> {
    authorize_request(&state.gate, &headers, Some(Role::User))?;
    Ok(Json(MessageResponse::new("User access confirmed")))
}

/// Identity carried by the presented token
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub username: String,
    pub email: String,
    pub roles: Vec<Role>,
    pub expires_at: DateTime<Utc>,
}

/// Current principal
///
/// GET /auth/me
#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Token is valid", body = MeResponse),
        (status = 401, description = "Missing, invalid or expired token", body = MessageResponse)
    ),
    security(("bearer_jwt" = [])),
    tag = "Auth"
)]
pub async fn me(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<MeResponse>, ApiError> {
    let claims = authorize_request(&state.gate, &headers, None)?;
    let expires_at = DateTime::from_timestamp(claims.exp, 0).ok_or_else(ApiError::internal)?;
    Ok(Json(MeResponse {
        username: claims.sub,
        email: claims.upn,
        roles: claims.groups,
        expires_at,
    }))
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}
