use sqlx::{AnyConnection, Connection};
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::db::descriptor::ConnectionDescriptor;
use crate::db::schema::MigrationStatement;
use crate::error::RefriError;

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub applied: usize,
}

/// Applies idempotent schema statements over a single connection.
#[derive(Debug, Clone)]
pub struct MigrationRunner {
    target: ConnectionDescriptor,
}

impl MigrationRunner {
    pub fn new(target: ConnectionDescriptor) -> Self {
        Self { target }
    }

    pub fn target(&self) -> &ConnectionDescriptor {
        &self.target
    }

    /// Open one connection, execute `statements` in order, close it.
    ///
    /// The first failing statement aborts the rest. The connection is closed
    /// on both the success and the failure path.
    pub async fn run(&self, statements: &[MigrationStatement]) -> Result<MigrationReport, RefriError> {
        sqlx::any::install_default_drivers();

        let url = self.target.to_url()?;
        let target = self.target.redacted();
        let started = Instant::now();

        let mut conn = AnyConnection::connect(url.as_str()).await.inspect_err(|e| {
            error!(db = %target, error = %e, "migration failed: could not connect");
        })?;

        let outcome = apply(&mut conn, statements).await;

        if let Err(e) = conn.close().await {
            warn!(db = %target, error = %e, "failed to close migration connection");
        }

        match &outcome {
            Ok(report) => info!(
                db = %target,
                applied = report.applied,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "migration completed successfully"
            ),
            Err(e) => error!(db = %target, error = %e, "migration failed"),
        }
        outcome
    }
}

async fn apply(
    conn: &mut AnyConnection,
    statements: &[MigrationStatement],
) -> Result<MigrationReport, RefriError> {
    for stmt in statements {
        debug!(statement = %stmt.name, "applying");
        sqlx::query(&stmt.sql)
            .execute(&mut *conn)
            .await
            .map_err(|source| RefriError::Migration {
                statement: stmt.name.clone(),
                source,
            })?;
    }
    Ok(MigrationReport {
        applied: statements.len(),
    })
}
