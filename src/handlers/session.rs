use axum::Json;
use serde::Serialize;

use crate::auth::Identity;

/// GET /api/session -> the caller's verified claims.
pub async fn session_handler(identity: Identity) -> Json<Identity> {
    Json(identity)
}

#[derive(Debug, Serialize)]
pub struct AdminOverview {
    pub subject: String,
    pub role: String,
}

/// GET /api/admin/overview -> admin-only summary of the caller.
pub async fn admin_overview_handler(identity: Identity) -> Json<AdminOverview> {
    Json(AdminOverview {
        subject: identity.subject,
        role: identity.role,
    })
}
