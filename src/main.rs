//! Portal server: authentication, authorization, and password reset for
//! the web portal.
//!
//! Main entry point that wires all crates together and starts the server.

use tracing_subscriber::{EnvFilter, fmt};

use portal_core::config::AppConfig;
use portal_core::error::AppError;
use portal_database::DatabasePool;
use portal_database::migration::run_migrations;

#[tokio::main]
async fn main() {
    let env = std::env::var("PORTAL_ENV").unwrap_or_else(|_| "development".to_string());
    let base = std::env::var("PORTAL_CONFIG").unwrap_or_else(|_| "config/default".to_string());

    let config = match AppConfig::load_from(&base, &env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e.detailed());
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(config = %base, env = %env, "Configuration loaded");

    if let Err(e) = run(config).await {
        tracing::error!(error = %e.detailed(), "Server error");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting portal v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    let db = DatabasePool::connect_with_retry(&config.database).await?;
    run_migrations(db.pool()).await?;

    // ── Step 2: Auth core + HTTP server ──────────────────────────
    portal_api::run_server(config, db).await
}
