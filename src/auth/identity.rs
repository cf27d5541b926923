use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::RefriError;

/// Decoded claims of a verified bearer token.
///
/// Lives in the request extensions for the duration of one request. Claims
/// other than the ones named here are kept verbatim in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(rename = "sub")]
    pub subject: String,
    pub role: String,
    /// Expiry, seconds since epoch.
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Identity {
    pub fn new(subject: impl Into<String>, role: impl Into<String>, exp: i64) -> Self {
        Self {
            subject: subject.into(),
            role: role.into(),
            exp,
            iat: None,
            extra: Map::new(),
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.role == role
    }

    /// Exact-match role check.
    pub fn require_role(&self, role: &str) -> Result<(), RefriError> {
        if self.has_role(role) {
            Ok(())
        } else {
            Err(RefriError::AccessDenied {
                required: role.to_string(),
            })
        }
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = RefriError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .ok_or(RefriError::Unauthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn role_check_is_exact() {
        let id = Identity::new("u1", "admin", 0);
        assert!(id.require_role("admin").is_ok());
        assert!(matches!(
            id.require_role("Admin"),
            Err(RefriError::AccessDenied { required }) if required == "Admin"
        ));
        assert!(id.require_role("manager").is_err());
    }

    #[test]
    fn unknown_claims_survive_decode() {
        let raw = json!({
            "sub": "u7",
            "role": "tecnico",
            "exp": 1_900_000_000,
            "iat": 1_800_000_000,
            "email": "u7@refri.example",
        });
        let id: Identity = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(id.subject, "u7");
        assert_eq!(id.iat, Some(1_800_000_000));
        assert_eq!(id.extra.get("email"), Some(&json!("u7@refri.example")));
        assert_eq!(serde_json::to_value(&id).unwrap(), raw);
    }

    #[test]
    fn expires_at_converts_epoch_seconds() {
        let id = Identity::new("u1", "admin", 1_700_000_000);
        assert_eq!(id.expires_at().unwrap().timestamp(), 1_700_000_000);
    }
}
