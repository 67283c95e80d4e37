//! Token validation and role checks.
//!
//! `authorize` is a pure decision over a presented bearer token:
//!
//! 1. no token → `MissingToken`
//! 2. decode + RS256 signature check against the public key
//! 3. `now > exp` → `Expired` (exact, no leeway)
//! 4. `iss` must equal the configured issuer
//! 5. if a role is required it must appear in `groups`
//!
//! Callers decide per operation whether a token is needed at all and which
//! role it must carry.

use std::sync::Arc;

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Validation;

use crate::config::TokenConfig;
use crate::identity::Role;
use crate::keys::{KeyManager, SIGNING_ALGORITHM};
use crate::token::Claims;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    MissingToken,
    Malformed,
    InvalidSignature,
    Expired,
    IssuerMismatch,
    MissingRole(Role),
}

impl DenyReason {
    /// 403 when the caller is authenticated but lacks the role, 401 otherwise.
    pub fn http_status(self) -> StatusCode {
        match self {
            Self::MissingRole(_) => StatusCode::FORBIDDEN,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::MissingToken => "Missing bearer token",
            Self::Malformed | Self::InvalidSignature | Self::IssuerMismatch => "Invalid token",
            Self::Expired => "Token expired",
            Self::MissingRole(_) => "Insufficient role for this operation",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow(Claims),
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow(_))
    }

    pub fn into_result(self) -> Result<Claims, DenyReason> {
        match self {
            Decision::Allow(claims) => Ok(claims),
            Decision::Deny(reason) => Err(reason),
        }
    }
}

pub struct AuthorizationGate {
    keys: Arc<KeyManager>,
    issuer: String,
    validation: Validation,
}

impl AuthorizationGate {
    pub fn new(keys: Arc<KeyManager>, config: &TokenConfig) -> Self {
        // Expiry and issuer are checked by hand, in order, against an injectable clock
        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        Self {
            keys,
            issuer: config.issuer.clone(),
            validation,
        }
    }

    pub fn authorize(&self, token: Option<&str>, required: Option<Role>) -> Decision {
        self.authorize_at(token, required, Utc::now())
    }

    pub fn authorize_at(
        &self,
        token: Option<&str>,
        required: Option<Role>,
        now: DateTime<Utc>,
    ) -> Decision {
        let decision = self.decide(token, required, now);
        if let Decision::Deny(reason) = &decision {
            tracing::debug!(?reason, ?required, "authorization denied");
        }
        decision
    }

    fn decide(&self, token: Option<&str>, required: Option<Role>, now: DateTime<Utc>) -> Decision {
        let Some(token) = token else {
            return Decision::Deny(DenyReason::MissingToken);
        };

        let claims = match self.keys.verify::<Claims>(token, &self.validation) {
            Ok(claims) => claims,
            Err(e) => {
                let reason = match e.kind() {
                    ErrorKind::InvalidSignature
                    | ErrorKind::InvalidAlgorithm
                    | ErrorKind::InvalidRsaKey(_) => DenyReason::InvalidSignature,
                    _ => DenyReason::Malformed,
                };
                return Decision::Deny(reason);
            }
        };

        if now.timestamp() > claims.exp {
            return Decision::Deny(DenyReason::Expired);
        }
        if claims.iss != self.issuer {
            return Decision::Deny(DenyReason::IssuerMismatch);
        }
        if let Some(role) = required.filter(|role| !claims.has_role(*role)) {
            return Decision::Deny(DenyReason::MissingRole(role));
        }

        Decision::Allow(claims)
    }
}
