//! Simulated revocation through the bridge.

use clap::Args;

use sessionwatch_bridge::{RevocationBridge, SimulationSpec, simulate_revocation};
use sessionwatch_core::error::AppError;
use sessionwatch_core::events::RevocationEvent;
use sessionwatch_core::types::RevocationReason;

use crate::output::{self, OutputFormat};

/// Arguments for the simulate command
#[derive(Debug, Args)]
pub struct SimulateArgs {
    /// Error code carried by the notice
    #[arg(long)]
    pub code: Option<String>,
    /// Revocation reason (e.g. replaced, revoked_by_admin)
    #[arg(short, long)]
    pub reason: Option<String>,
    /// Identifier of the replacing session
    #[arg(long)]
    pub replaced_by: Option<String>,
    /// Revocation time in epoch milliseconds
    #[arg(long)]
    pub revoked_at: Option<i64>,
    /// Display message
    #[arg(short, long)]
    pub error: Option<String>,
}

impl SimulateArgs {
    fn to_spec(&self) -> SimulationSpec {
        SimulationSpec {
            code: self.code.clone(),
            reason: self.reason.as_deref().map(RevocationReason::from),
            replaced_by: self.replaced_by.clone(),
            revoked_at: self.revoked_at,
            error: self.error.clone(),
        }
    }
}

/// Execute the simulate command
pub async fn execute(
    args: &SimulateArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path).await?;
    let bridge = RevocationBridge::new(&config.bridge);

    bridge.subscribe(move |event: &RevocationEvent| {
        output::print_heading(event.name());
        output::print_item(event.notice(), format);
    });

    let (_, delivered) = simulate_revocation(&bridge, args.to_spec());
    output::print_success(&format!("Simulated revocation delivered to {} listener(s)", delivered));
    Ok(())
}
