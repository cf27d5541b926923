//! Database module: schema migrations for the booking store.
//!
//! Layout:
//! - `descriptor.rs`: connection target (URL or discrete parameters)
//! - `schema.rs`: bundled idempotent statements and script loading
//! - `migration.rs`: the single-connection runner

pub mod descriptor;
pub mod migration;
pub mod schema;

pub use descriptor::ConnectionDescriptor;
pub use migration::{MigrationReport, MigrationRunner};
pub use schema::{MigrationStatement, StatementSource, parse_script};
