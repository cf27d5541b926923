use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use std::fmt;

use crate::auth::Identity;
use crate::error::{RefriError, VerificationFailure};

/// Turns a raw bearer token into an [`Identity`].
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<Identity, VerificationFailure>;
}

/// HS256 JWT verifier keyed by a shared secret.
#[derive(Clone)]
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Result<Self, RefriError> {
        if secret.trim().is_empty() {
            return Err(RefriError::MissingJwtSecret);
        }
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        // No audience is configured; `aud` is kept as an ordinary claim.
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "sub"]);
        Ok(Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }
}

impl TokenVerifier for JwtVerifier {
    fn verify(&self, token: &str) -> Result<Identity, VerificationFailure> {
        let data = decode::<Identity>(token, &self.key, &self.validation)?;
        Ok(data.claims)
    }
}

impl fmt::Debug for JwtVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtVerifier")
            .field("key", &"[REDACTED]")
            .field("algorithms", &self.validation.algorithms)
            .finish()
    }
}
