pub mod auth;

pub use auth::{AuthGate, RequiredRole, authenticate, bearer_token, require_role};
