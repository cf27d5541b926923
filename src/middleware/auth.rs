use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::auth::{Identity, JwtVerifier, TokenVerifier};
use crate::config::Config;
use crate::error::RefriError;

/// Request gate: bearer credential in, [`Identity`] out.
#[derive(Clone)]
pub struct AuthGate {
    verifier: Arc<dyn TokenVerifier>,
}

impl AuthGate {
    pub fn new(verifier: impl TokenVerifier + 'static) -> Self {
        Self {
            verifier: Arc::new(verifier),
        }
    }

    /// Build the JWT gate from configuration. Fails when `JWT_SECRET` is unset,
    /// so a misconfigured process never reaches the point of serving traffic.
    pub fn from_config(cfg: &Config) -> Result<Self, RefriError> {
        let secret = cfg
            .jwt_secret
            .as_deref()
            .ok_or(RefriError::MissingJwtSecret)?;
        Ok(Self::new(JwtVerifier::new(secret)?))
    }

    pub fn authenticate(&self, headers: &HeaderMap) -> Result<Identity, RefriError> {
        let token = bearer_token(headers).ok_or(RefriError::Unauthenticated)?;
        Ok(self.verifier.verify(token)?)
    }
}

/// Text following `Bearer ` in the `Authorization` header.
/// Missing, non-UTF-8, differently-prefixed or empty values all yield `None`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Verify the bearer credential and attach the decoded [`Identity`] to the request.
pub async fn authenticate(
    State(gate): State<AuthGate>,
    mut request: Request,
    next: Next,
) -> Response {
    match gate.authenticate(request.headers()) {
        Ok(identity) => {
            debug!(
                subject = %identity.subject,
                role = %identity.role,
                expires_at = ?identity.expires_at(),
                "request authenticated"
            );
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(err) => {
            match &err {
                RefriError::Unauthenticated => debug!("authentication failed: no bearer credential"),
                other => warn!(reason = %other, "authentication failed"),
            }
            err.into_response()
        }
    }
}

/// Role demanded by [`require_role`]; pass it as the middleware state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredRole(Arc<str>);

impl RequiredRole {
    pub fn new(role: impl AsRef<str>) -> Self {
        Self(Arc::from(role.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Let the request through only when the authenticated role matches exactly.
/// Must be layered inside [`authenticate`].
pub async fn require_role(
    State(required): State<RequiredRole>,
    request: Request,
    next: Next,
) -> Response {
    let decision = match request.extensions().get::<Identity>() {
        Some(identity) => identity.require_role(required.as_str()),
        None => {
            error!(required = %required.as_str(), "role check reached without an authenticated identity");
            Err(RefriError::AccessDenied {
                required: required.as_str().to_string(),
            })
        }
    };

    match decision {
        Ok(()) => next.run(request).await,
        Err(err) => {
            warn!(required = %required.as_str(), "access denied: role mismatch");
            err.into_response()
        }
    }
}
