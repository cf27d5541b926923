use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;

/// Prefix of the message returned when the caller lacks the required role.
pub const ACCESS_DENIED_MESSAGE: &str = "Acceso denegado";

#[derive(Debug, ThisError)]
pub enum RefriError {
    #[error("JWT_SECRET is not configured; refusing to start")]
    MissingJwtSecret,

    #[error("Configuration error: {0}")]
    Config(#[from] figment::Error),

    #[error("Missing database setting: {0}")]
    MissingDatabaseSetting(&'static str),

    #[error("Invalid database URL: {0}")]
    InvalidDatabaseUrl(#[from] url::ParseError),

    #[error("Missing or malformed bearer credential")]
    Unauthenticated,

    #[error("Credential rejected: {0}")]
    InvalidCredential(#[from] VerificationFailure),

    #[error("Role '{required}' required")]
    AccessDenied { required: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] SqlxError),

    #[error("Migration statement '{statement}' failed: {source}")]
    Migration {
        statement: String,
        #[source]
        source: SqlxError,
    },
}

/// Why a presented token could not be turned into an identity.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum VerificationFailure {
    #[error("token expired")]
    Expired,

    #[error("bad signature")]
    BadSignature,

    #[error("malformed token: {0}")]
    Malformed(String),
}

impl From<jsonwebtoken::errors::Error> for VerificationFailure {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match e.kind() {
            ErrorKind::ExpiredSignature => VerificationFailure::Expired,
            ErrorKind::InvalidSignature => VerificationFailure::BadSignature,
            _ => VerificationFailure::Malformed(e.to_string()),
        }
    }
}

impl IntoResponse for RefriError {
    fn into_response(self) -> axum::response::Response {
        match self {
            // Gate rejections carry no body.
            RefriError::Unauthenticated => StatusCode::UNAUTHORIZED.into_response(),
            RefriError::InvalidCredential(_) => StatusCode::FORBIDDEN.into_response(),
            RefriError::AccessDenied { required } => (
                StatusCode::FORBIDDEN,
                Json(ApiErrorResponse {
                    error: format!("{ACCESS_DENIED_MESSAGE}: se requiere rol {required}"),
                }),
            )
                .into_response(),
            RefriError::MissingJwtSecret
            | RefriError::Config(_)
            | RefriError::MissingDatabaseSetting(_)
            | RefriError::InvalidDatabaseUrl(_)
            | RefriError::Io(_)
            | RefriError::Database(_)
            | RefriError::Migration { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiErrorResponse {
                    error: "An internal server error occurred.".to_string(),
                }),
            )
                .into_response(),
        }
    }
}

/// JSON error body: `{"error": "<message>"}`.
#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: String,
}
