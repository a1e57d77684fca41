//! Offline password hashing.

use clap::Args;

use portal_auth::PasswordHasher;
use portal_core::config::AppConfig;
use portal_core::error::AppError;

/// Arguments for hash-password
#[derive(Debug, Args)]
pub struct HashPasswordArgs {
    /// Password to hash; prompted for when omitted
    #[arg(long)]
    pub password: Option<String>,
}

/// Print an Argon2id digest suitable for the identities table.
pub fn execute(args: &HashPasswordArgs, config: &AppConfig) -> Result<(), AppError> {
    let password = match &args.password {
        Some(p) => p.clone(),
        None => super::prompt_password("Password")?,
    };

    let hasher = PasswordHasher::new(&config.auth)?;
    println!("{}", hasher.hash(&password)?);
    Ok(())
}
