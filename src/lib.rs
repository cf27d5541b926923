pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod migrate;
pub mod middleware;
pub mod router;
pub mod telemetry;

pub use auth::Identity;
pub use error::RefriError;
pub use middleware::auth::AuthGate;
