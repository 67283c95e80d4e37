//! Per-handler authorization.
//!
//! Role requirements are not attached to routes as metadata; each guarded
//! handler calls [`authorize_request`] first with the role it needs.

use axum::http::{HeaderMap, header};

use crate::authz::AuthorizationGate;
use crate::gateway::error::ApiError;
use crate::identity::Role;
use crate::token::Claims;

/// Extract the bearer value from the `Authorization` header.
///
/// The scheme name is matched case-insensitively. A header with any other
/// scheme is passed through as-is and will fail token decoding.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?.trim();
    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") => Some(token.trim()),
        _ => Some(value),
    }
}

pub fn authorize_request(
    gate: &AuthorizationGate,
    headers: &HeaderMap,
    required: Option<Role>,
) -> Result<Claims, ApiError> {
    gate.authorize(bearer_token(headers), required)
        .into_result()
        .map_err(ApiError::from)
}
