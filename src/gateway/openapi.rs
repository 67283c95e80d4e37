//! OpenAPI document
//!
//! Served as JSON at `/api-docs/openapi.json`.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::gateway::error::MessageResponse;
use crate::gateway::handlers::HealthResponse;
use crate::identity::Role;
use crate::user_auth::handlers::MeResponse;
use crate::user_auth::{AuthResponse, LoginRequest, SignupRequest};

/// RS256 bearer token security scheme
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            let scheme = HttpBuilder::new()
                .scheme(HttpAuthScheme::Bearer)
                .bearer_format("JWT")
                .description(Some(
                    "RS256 JWT from /auth/signup or /auth/login, valid for 24 hours",
                ))
                .build();
            components.add_security_scheme("bearer_jwt", SecurityScheme::Http(scheme));
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bookshelf Auth API",
        version = "1.0.0",
        description = "Registration, login and role-gated access for the bookshelf service.",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health::health_check,
        crate::user_auth::handlers::signup,
        crate::user_auth::handlers::login,
        crate::user_auth::handlers::admin_probe,
        crate::user_auth::handlers::user_probe,
        crate::user_auth::handlers::me,
    ),
    components(schemas(
        SignupRequest,
        LoginRequest,
        AuthResponse,
        MessageResponse,
        MeResponse,
        HealthResponse,
        Role,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Registration, login and role probes"),
        (name = "System", description = "Health and diagnostics"),
    )
)]
pub struct ApiDoc;
