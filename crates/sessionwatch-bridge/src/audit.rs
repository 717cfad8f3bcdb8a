//! Audit trail for revocation emissions.

use tracing::info;

use sessionwatch_core::events::RevocationEvent;

/// Log an emitted revocation.
pub fn log_emission(event: &RevocationEvent, delivered: usize) {
    let notice = event.notice();
    match event {
        RevocationEvent::Detected { session, .. } => info!(
            event = event.name(),
            origin = "poller",
            uid = %session.uid,
            reason = %notice.reason,
            replaced_by = ?notice.replaced_by,
            delivered,
            "Revocation broadcast"
        ),
        RevocationEvent::Simulated(_) => info!(
            event = event.name(),
            origin = "simulation",
            code = %notice.code,
            reason = %notice.reason,
            replaced_by = ?notice.replaced_by,
            delivered,
            "Revocation broadcast"
        ),
    }
}
