//! CLI command definitions and dispatch.

pub mod hash_password;
pub mod identity;
pub mod migrate;
pub mod policy;

use clap::{Parser, Subcommand};

use portal_core::config::AppConfig;
use portal_core::error::AppError;
use portal_database::DatabasePool;

use crate::output::OutputFormat;

/// Portal administration
#[derive(Debug, Parser)]
#[command(name = "portal-cli", version, about, long_about = None)]
pub struct Cli {
    /// Base configuration file (without extension)
    #[arg(short, long, default_value = "config/default")]
    pub config: String,

    /// Environment overlay to apply
    #[arg(short, long, env = "PORTAL_ENV", default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Identity management
    Identity(identity::IdentityArgs),
    /// Authorization policy management
    Policy(policy::PolicyArgs),
    /// Hash a password with the configured Argon2 parameters
    HashPassword(hash_password::HashPasswordArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let config = AppConfig::load_from(&self.config, &self.env)?;

        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, &config).await,
            Commands::Identity(args) => identity::execute(args, &config, self.format).await,
            Commands::Policy(args) => policy::execute(args, &config, self.format).await,
            Commands::HashPassword(args) => hash_password::execute(args, &config),
        }
    }
}

/// Helper: connect to the database without startup retries.
pub async fn connect(config: &AppConfig) -> Result<DatabasePool, AppError> {
    DatabasePool::connect(&config.database).await
}

/// Helper: interactive password prompt with confirmation.
pub fn prompt_password(prompt: &str) -> Result<String, AppError> {
    dialoguer::Password::new()
        .with_prompt(prompt)
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()
        .map_err(|e| AppError::internal(format!("Input error: {e}")))
}
