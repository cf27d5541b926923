use axum::{Router, middleware::from_fn_with_state, routing::get};

use crate::handlers::health::health_handler;
use crate::handlers::session::{admin_overview_handler, session_handler};
use crate::middleware::auth::{AuthGate, RequiredRole, authenticate, require_role};

pub const ADMIN_ROLE: &str = "admin";

#[derive(Clone)]
pub struct RefriState {
    pub gate: AuthGate,
}

impl RefriState {
    pub fn new(gate: AuthGate) -> Self {
        Self { gate }
    }
}

pub fn refri_router(state: RefriState) -> Router {
    // Layers added later run first: authenticate wraps require_role.
    let admin = Router::new()
        .route("/overview", get(admin_overview_handler))
        .route_layer(from_fn_with_state(
            RequiredRole::new(ADMIN_ROLE),
            require_role,
        ));

    let api = Router::new()
        .route("/session", get(session_handler))
        .nest("/admin", admin)
        .route_layer(from_fn_with_state(state.gate.clone(), authenticate));

    Router::new()
        .route("/health", get(health_handler))
        .nest("/api", api)
}
