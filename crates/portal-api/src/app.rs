//! Application builder: wires router, middleware, and state into an Axum
//! app, and runs the server with its housekeeping task.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use portal_cache::RevocationCacheManager;
use portal_core::config::AppConfig;
use portal_core::error::{AppError, ErrorKind};
use portal_core::traits::{Clock, SystemClock};
use portal_database::DatabasePool;
use portal_database::repositories::{
    PgIdentityRepository, PgPolicyRepository, PgResetTokenRepository,
};

use crate::middleware::cors::build_cors_layer;
use crate::router::build_router;
use crate::state::{AppState, Backends};

/// Rate-limit buckets idle this long are dropped by housekeeping.
const RATE_LIMIT_IDLE: Duration = Duration::from_secs(600);

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors);
    build_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Runs the portal server with the given configuration and database pool.
pub async fn run_server(config: AppConfig, db: DatabasePool) -> Result<(), AppError> {
    info!("Starting portal server...");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // ── Step 1: Initialize cache ─────────────────────────────────
    info!(provider = %config.cache.provider, "Initializing revocation cache");
    let cache = Arc::new(RevocationCacheManager::new(&config.cache, Arc::clone(&clock)).await?);

    // ── Step 2: Initialize mail delivery ─────────────────────────
    let mailer = portal_mail::build_mailer(&config.email)?;

    // ── Step 3: Assemble auth core ───────────────────────────────
    let backends = Backends {
        identities: Arc::new(PgIdentityRepository::new(&db)),
        resets: Arc::new(PgResetTokenRepository::new(&db)),
        policies: Arc::new(PgPolicyRepository::new(&db)),
        cache,
        mailer,
        clock,
    };
    let cleanup_interval = Duration::from_secs(config.cache.cleanup_interval_seconds.max(1));
    let addr = format!("{}:{}", config.server.host, config.server.port);

    let state = AppState::initialize(config, backends).await?;
    info!(rules = state.rbac_enforcer.rule_count(), "Policy engine ready");

    // ── Step 4: Shutdown channel & housekeeping ──────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let housekeeping = spawn_housekeeping(state.clone(), cleanup_interval, shutdown_rx);

    // ── Step 5: Build and start HTTP server ──────────────────────
    let app = build_app(state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Internal, format!("Failed to bind {addr}"), e)
        })?;

    info!(address = %addr, "Portal server listening");

    let served = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await;

    let _ = shutdown_tx.send(true);
    if let Err(e) = housekeeping.await {
        error!(error = %e, "Housekeeping task ended abnormally");
    }
    db.close().await;

    served.map_err(|e| AppError::with_source(ErrorKind::Internal, "Server error", e))?;

    info!("Portal server stopped");
    Ok(())
}

/// Periodically purges expired reset rows, sweeps the revocation cache,
/// and drops idle rate-limit buckets until `shutdown` flips.
pub fn spawn_housekeeping(
    state: AppState,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = state.reset_cleanup.run_cleanup().await {
                        error!(error = %e.detailed(), "Auth cleanup failed");
                    }
                    if let Some(limiter) = &state.rate_limiter {
                        limiter.prune(RATE_LIMIT_IDLE);
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Housekeeping stopped");
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
