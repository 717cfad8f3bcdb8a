//! Simulation harness for the revocation path.
//!
//! Emits a [`RevocationEvent::Simulated`] so consumers can be exercised
//! without a backend actually revoking anything.

use serde::{Deserialize, Serialize};

use sessionwatch_core::events::{RevocationEvent, RevocationNotice, SESSION_REVOKED_CODE, now_millis};
use sessionwatch_core::types::RevocationReason;

use crate::event_bridge::RevocationBridge;

/// What a simulated revocation should carry. Unset fields take defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationSpec {
    /// Code; defaults to `SESSION_REVOKED`.
    #[serde(default)]
    pub code: Option<String>,
    /// Reason; defaults to `replaced`.
    #[serde(default)]
    pub reason: Option<RevocationReason>,
    /// Replacing session identifier.
    #[serde(default)]
    pub replaced_by: Option<String>,
    /// Revocation time in epoch milliseconds; defaults to now.
    #[serde(default)]
    pub revoked_at: Option<i64>,
    /// Display message; defaults to `Session révoquée`.
    #[serde(default)]
    pub error: Option<String>,
}

impl SimulationSpec {
    /// Materialize the notice this spec describes.
    pub fn into_notice(self) -> RevocationNotice {
        RevocationNotice::new(
            self.code.unwrap_or_else(|| SESSION_REVOKED_CODE.to_string()),
            self.reason.unwrap_or(RevocationReason::Replaced),
            self.replaced_by,
            self.revoked_at.unwrap_or_else(now_millis),
            self.error.unwrap_or_else(|| "Session révoquée".to_string()),
        )
    }
}

/// Emit a simulated revocation. Returns the notice that was sent and the
/// number of listeners that received it.
pub fn simulate_revocation(
    bridge: &RevocationBridge,
    spec: SimulationSpec,
) -> (RevocationNotice, usize) {
    let notice = spec.into_notice();
    tracing::info!(
        code = %notice.code,
        reason = %notice.reason,
        "Simulating session revocation"
    );
    let delivered = bridge.emit(RevocationEvent::Simulated(notice.clone()));
    (notice, delivered)
}
