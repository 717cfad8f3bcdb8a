//! SessionWatch — session liveness watcher
//!
//! Composition root: loads configuration, owns the revocation bridge, and
//! keeps the session poller following the auth context until shutdown.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, fmt};

use sessionwatch_bridge::RevocationBridge;
use sessionwatch_client::{AuthContext, BridgeObserver, SessionPoller, spawn_follower};
use sessionwatch_core::config::AppConfig;
use sessionwatch_core::error::AppError;
use sessionwatch_core::events::RevocationEvent;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Watcher error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration for the environment named by `SESSIONWATCH_ENV`
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("SESSIONWATCH_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
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

/// Wire the bridge, poller, and auth context, then wait for shutdown
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting SessionWatch v{}", env!("CARGO_PKG_VERSION"));

    let uid = std::env::var("SESSIONWATCH_UID")
        .map_err(|_| AppError::configuration("SESSIONWATCH_UID must name the user to watch"))?;

    let bridge = Arc::new(RevocationBridge::new(&config.bridge));
    let auth = AuthContext::new();
    let shutdown = CancellationToken::new();

    // A revoked session ends the login; polling stops with it.
    {
        let auth = auth.clone();
        bridge.subscribe(move |event: &RevocationEvent| {
            let notice = event.notice();
            tracing::warn!(
                code = %notice.code,
                reason = %notice.reason,
                replaced_by = ?notice.replaced_by,
                revoked_at = notice.revoked_at,
                "{}",
                notice.error
            );
            auth.logout();
        });
    }

    let poller = Arc::new(SessionPoller::from_config(
        &config.poller,
        Arc::new(BridgeObserver::new(Arc::clone(&bridge))),
    )?);

    let follower = spawn_follower(Arc::clone(&poller), auth.subscribe(), shutdown.clone());
    auth.login(uid);

    shutdown_signal().await;
    tracing::info!("Shutdown signal received");
    shutdown.cancel();

    follower
        .await
        .map_err(|e| AppError::internal(format!("Auth follower task failed: {e}")))?;

    let metrics = bridge.metrics();
    tracing::info!(
        events_emitted = metrics.events_emitted,
        listener_deliveries = metrics.listener_deliveries,
        "SessionWatch stopped"
    );
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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
}
