//! Policy rule management CLI commands.
//!
//! Changes go straight to the rule table. A running server picks them up
//! on its next reload.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use portal_core::config::AppConfig;
use portal_core::error::AppError;
use portal_database::repositories::{PgPolicyRepository, PolicyRepository};
use portal_entity::policy::PolicyRule;

use crate::output::{self, OutputFormat};

/// Arguments for policy commands
#[derive(Debug, Args)]
pub struct PolicyArgs {
    /// Policy subcommand
    #[command(subcommand)]
    pub command: PolicyCommand,
}

/// Policy subcommands
#[derive(Debug, Subcommand)]
pub enum PolicyCommand {
    /// List stored rules
    List,
    /// Add a rule
    Add(RuleArgs),
    /// Remove a rule
    Remove(RuleArgs),
}

/// A `(role, resource, action)` triple on the command line.
#[derive(Debug, Args)]
pub struct RuleArgs {
    /// Role
    pub role: String,
    /// Resource path, e.g. /api/admin
    pub resource: String,
    /// Action (HTTP method)
    pub action: String,
}

impl From<&RuleArgs> for PolicyRule {
    fn from(args: &RuleArgs) -> Self {
        PolicyRule::new(args.role.as_str(), args.resource.as_str(), args.action.as_str())
    }
}

/// Policy display row for table output
#[derive(Debug, Serialize, Tabled)]
struct RuleRow {
    /// Role
    role: String,
    /// Resource
    resource: String,
    /// Action
    action: String,
}

/// Execute policy commands
pub async fn execute(
    args: &PolicyArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let db = super::connect(config).await?;
    let repo = PgPolicyRepository::new(&db);

    match &args.command {
        PolicyCommand::List => {
            let mut rules = repo.list().await?;
            rules.sort();
            let rows: Vec<RuleRow> = rules
                .into_iter()
                .map(|r| RuleRow {
                    role: r.role,
                    resource: r.resource,
                    action: r.action,
                })
                .collect();
            output::print_list(&rows, format);
        }
        PolicyCommand::Add(rule_args) => {
            let rule = PolicyRule::from(rule_args);
            if !rule.is_complete() {
                return Err(AppError::validation("role, resource and action are required"));
            }
            if repo.add(&rule).await? {
                output::print_success(&format!(
                    "Rule added: {} {} {}",
                    rule.role, rule.action, rule.resource
                ));
            } else {
                output::print_warning("Rule already exists");
            }
        }
        PolicyCommand::Remove(rule_args) => {
            let rule = PolicyRule::from(rule_args);
            if repo.remove(&rule).await? {
                output::print_success(&format!(
                    "Rule removed: {} {} {}",
                    rule.role, rule.action, rule.resource
                ));
            } else {
                output::print_warning("Rule not found");
            }
        }
    }

    db.close().await;
    Ok(())
}
