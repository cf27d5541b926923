//! `migrate` command: pick a plan, load its statements, run them once.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

use crate::config::Config;
use crate::db::schema::{BOOKINGS_SCRIPT, user_roles_statements};
use crate::db::{MigrationRunner, StatementSource};
use crate::error::RefriError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Plan {
    /// Add the `role` column to `users`.
    UserRoles,
    /// Apply the bookings column script.
    Bookings,
}

/// Apply one idempotent schema migration to the configured database.
#[derive(Debug, Parser)]
#[command(name = "migrate", version)]
pub struct MigrateArgs {
    #[arg(value_enum)]
    pub plan: Plan,

    /// SQL script to apply instead of the plan's bundled statements.
    #[arg(long)]
    pub file: Option<PathBuf>,
}

impl MigrateArgs {
    pub fn source(&self) -> StatementSource {
        match (&self.file, self.plan) {
            (Some(path), _) => StatementSource::File(path.clone()),
            (None, Plan::UserRoles) => StatementSource::Inline(user_roles_statements()),
            (None, Plan::Bookings) => StatementSource::File(PathBuf::from(BOOKINGS_SCRIPT)),
        }
    }
}

/// Run the selected plan; returns the number of statements applied.
pub async fn migrate(args: &MigrateArgs, cfg: &Config) -> Result<usize, RefriError> {
    let statements = args.source().load()?;
    let runner = MigrationRunner::new(cfg.connection_descriptor()?);
    info!(
        plan = ?args.plan,
        db = %runner.target().redacted(),
        statements = statements.len(),
        "starting migration"
    );
    let report = runner.run(&statements).await?;
    Ok(report.applied)
}

/// [`migrate`] mapped to a process exit status: 0 on success, 1 on any failure.
pub async fn run(args: &MigrateArgs, cfg: &Config) -> ExitCode {
    match migrate(args, cfg).await {
        Ok(applied) => {
            info!(plan = ?args.plan, applied, "done");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(plan = ?args.plan, error = %e, "migration aborted");
            ExitCode::FAILURE
        }
    }
}
