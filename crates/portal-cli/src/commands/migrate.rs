//! Database migration command.

use clap::Args;

use portal_core::config::AppConfig;
use portal_core::error::AppError;

use crate::output;

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {}

/// Apply all pending migrations.
pub async fn execute(_args: &MigrateArgs, config: &AppConfig) -> Result<(), AppError> {
    let db = super::connect(config).await?;

    println!("Running database migrations...");
    portal_database::migration::run_migrations(db.pool()).await?;
    db.close().await;

    output::print_success("All migrations applied successfully.");
    Ok(())
}
