//! Identity management CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use portal_auth::{PasswordHasher, PasswordValidator};
use portal_core::config::AppConfig;
use portal_core::error::AppError;
use portal_database::repositories::{IdentityRepository, PgIdentityRepository};
use portal_entity::identity::{CreateIdentity, IdentityStatus};

use crate::output::{self, OutputFormat};

/// Arguments for identity commands
#[derive(Debug, Args)]
pub struct IdentityArgs {
    /// Identity subcommand
    #[command(subcommand)]
    pub command: IdentityCommand,
}

/// Identity subcommands
#[derive(Debug, Subcommand)]
pub enum IdentityCommand {
    /// Create an identity
    Create {
        /// Username
        username: String,
        /// Email address for reset mail
        #[arg(long)]
        email: Option<String>,
        /// Role to assign (repeatable)
        #[arg(short, long = "role", required = true)]
        roles: Vec<String>,
        /// Initial status
        #[arg(long, default_value = "active")]
        status: String,
        /// Password; prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Change an identity's status
    SetStatus {
        /// Username
        username: String,
        /// New status: active, inactive, or suspended
        status: String,
    },
    /// List all identities
    List,
}

/// Identity display row for table output
#[derive(Debug, Serialize, Tabled)]
struct IdentityRow {
    /// Identity ID
    id: i64,
    /// Username
    username: String,
    /// Email
    email: String,
    /// Roles
    roles: String,
    /// Status
    status: String,
    /// Created at
    created_at: String,
}

/// Execute identity commands
pub async fn execute(
    args: &IdentityArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let db = super::connect(config).await?;
    let repo = PgIdentityRepository::new(&db);

    match &args.command {
        IdentityCommand::Create {
            username,
            email,
            roles,
            status,
            password,
        } => {
            let status: IdentityStatus = status.parse()?;
            let password = match password {
                Some(p) => p.clone(),
                None => super::prompt_password("Password")?,
            };

            PasswordValidator::new(&config.auth).validate(&password, &[username.as_str()])?;
            let password_hash = PasswordHasher::new(&config.auth)?.hash(&password)?;

            let identity = repo
                .create(&CreateIdentity {
                    username: username.clone(),
                    email: email.clone(),
                    password_hash,
                    roles: roles.clone(),
                    status,
                })
                .await?;

            output::print_success(&format!(
                "Identity '{}' created (id {})",
                identity.username, identity.id
            ));
        }
        IdentityCommand::SetStatus { username, status } => {
            let status: IdentityStatus = status.parse()?;
            let identity = repo
                .find_by_username(username)
                .await?
                .ok_or_else(|| {
                    AppError::not_found(format!("Identity '{username}' not found"))
                })?;

            repo.update_status(identity.id, status).await?;
            output::print_success(&format!("Identity '{username}' is now {status}"));
        }
        IdentityCommand::List => {
            let rows: Vec<IdentityRow> = repo
                .list()
                .await?
                .into_iter()
                .map(|i| IdentityRow {
                    id: i.id,
                    username: i.username,
                    email: i.email.unwrap_or_default(),
                    roles: i.roles.join(","),
                    status: i.status.to_string(),
                    created_at: i.created_at.format("%Y-%m-%d %H:%M").to_string(),
                })
                .collect();

            output::print_list(&rows, format);
        }
    }

    db.close().await;
    Ok(())
}
