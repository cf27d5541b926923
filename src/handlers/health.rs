use axum::Json;
use serde_json::{Value, json};

/// GET /health -> liveness check, no authentication.
pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
