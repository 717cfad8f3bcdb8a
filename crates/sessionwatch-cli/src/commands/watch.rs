//! Continuous polling until revocation or Ctrl-C.

use std::sync::Arc;

use clap::Args;
use tokio_util::sync::CancellationToken;

use sessionwatch_bridge::RevocationBridge;
use sessionwatch_client::{AuthContext, BridgeObserver, SessionPoller, spawn_follower};
use sessionwatch_core::error::AppError;
use sessionwatch_core::events::RevocationEvent;

use crate::output;

/// Arguments for the watch command
#[derive(Debug, Args)]
pub struct WatchArgs {
    /// User identifier the session belongs to
    #[arg(short, long)]
    pub uid: String,

    /// Override the configured polling interval (seconds)
    #[arg(short, long)]
    pub interval: Option<u64>,
}

/// Execute the watch command
pub async fn execute(args: &WatchArgs, config_path: &str) -> Result<(), AppError> {
    let mut config = super::load_config(config_path).await?;
    if let Some(interval) = args.interval {
        config.poller.interval_seconds = interval;
        config.validate()?;
    }

    let bridge = Arc::new(RevocationBridge::new(&config.bridge));
    let auth = AuthContext::new();
    let shutdown = CancellationToken::new();

    {
        let auth = auth.clone();
        let shutdown = shutdown.clone();
        bridge.subscribe(move |event: &RevocationEvent| {
            let notice = event.notice();
            output::print_warning(&format!(
                "Session revoked: reason={} replaced_by={} error={}",
                notice.reason,
                notice.replaced_by.as_deref().unwrap_or("-"),
                notice.error
            ));
            auth.logout();
            shutdown.cancel();
        });
    }

    let poller = Arc::new(SessionPoller::from_config(
        &config.poller,
        Arc::new(BridgeObserver::new(Arc::clone(&bridge))),
    )?);

    let follower = spawn_follower(Arc::clone(&poller), auth.subscribe(), shutdown.clone());
    auth.login(args.uid.clone());
    output::print_success(&format!(
        "Watching session for '{}' every {}s (Ctrl-C to stop)",
        args.uid, config.poller.interval_seconds
    ));

    tokio::select! {
        _ = shutdown.cancelled() => {}
        _ = tokio::signal::ctrl_c() => {
            shutdown.cancel();
        }
    }

    follower
        .await
        .map_err(|e| AppError::internal(format!("Watch task failed: {}", e)))?;
    Ok(())
}
