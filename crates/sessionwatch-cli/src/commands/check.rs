//! One-shot session status check.

use std::sync::Arc;

use clap::Args;
use serde::Serialize;

use sessionwatch_client::{CheckOutcome, FnObserver, SessionPoller};
use sessionwatch_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Arguments for the check command
#[derive(Debug, Args)]
pub struct CheckArgs {
    /// User identifier the session belongs to
    #[arg(short, long)]
    pub uid: String,

    /// Override the configured status endpoint
    #[arg(long)]
    pub url: Option<String>,
}

/// Printable check result
#[derive(Debug, Serialize)]
struct CheckReport {
    outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<serde_json::Value>,
}

impl CheckReport {
    fn from_outcome(outcome: &CheckOutcome) -> Result<Self, AppError> {
        let (status, detail) = match outcome {
            CheckOutcome::Revoked(session) => (Some(401), Some(serde_json::to_value(session)?)),
            CheckOutcome::Updated(session) => (None, Some(serde_json::to_value(session)?)),
            CheckOutcome::NoSession => (None, None),
            CheckOutcome::Ignored { status } => (Some(*status), None),
        };
        Ok(Self {
            outcome: outcome.label(),
            status,
            detail,
        })
    }
}

/// Execute the check command
pub async fn execute(
    args: &CheckArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let mut config = super::load_config(config_path).await?;
    if let Some(url) = &args.url {
        config.poller.status_url = url.clone();
    }

    let poller = SessionPoller::from_config(
        &config.poller,
        Arc::new(FnObserver::new(|_| {}, |_| {})),
    )?;

    let outcome = poller.check_once(&args.uid).await?;
    let report = CheckReport::from_outcome(&outcome)?;
    output::print_item(&report, format);

    match outcome {
        CheckOutcome::Revoked(session) => {
            output::print_warning(&format!(
                "Session for '{}' was revoked ({})",
                session.uid, session.reason
            ));
        }
        CheckOutcome::Updated(session) if session.is_active() => {
            output::print_success(&format!(
                "Session for '{}' is active",
                session.uid.as_deref().unwrap_or(&args.uid)
            ));
        }
        _ => {}
    }

    Ok(())
}
