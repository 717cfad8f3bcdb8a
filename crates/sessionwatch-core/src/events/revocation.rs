//! Revocation broadcast payloads.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::types::session::{RevocationReason, RevokedSession};

/// Name under which revocation events are broadcast.
pub const SESSION_REVOKED_EVENT: &str = "sessionRevoked";

/// Error code the status endpoint uses to signal revocation.
pub const SESSION_REVOKED_CODE: &str = "SESSION_REVOKED";

/// Payload delivered to revocation listeners.
///
/// Serializes as `{ success, code, reason, replacedBy?, revokedAt, error }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevocationNotice {
    /// Always `false`.
    pub success: bool,
    /// Machine-readable code, normally `SESSION_REVOKED`.
    pub code: String,
    /// Revocation reason code.
    pub reason: RevocationReason,
    /// Session that replaced the revoked one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replaced_by: Option<String>,
    /// Revocation time in epoch milliseconds.
    pub revoked_at: i64,
    /// Message suitable for display.
    pub error: String,
}

impl RevocationNotice {
    /// Build a notice with `success: false`.
    pub fn new(
        code: impl Into<String>,
        reason: RevocationReason,
        replaced_by: Option<String>,
        revoked_at: i64,
        error: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            code: code.into(),
            reason,
            replaced_by,
            revoked_at,
            error: error.into(),
        }
    }

    /// Derive the broadcast notice from a detected revocation.
    ///
    /// Missing server values fall back to the detection time and a generic
    /// message.
    pub fn from_revoked(session: &RevokedSession) -> Self {
        Self::new(
            SESSION_REVOKED_CODE,
            session.reason.clone(),
            session.replaced_by.clone(),
            session
                .revoked_at
                .unwrap_or_else(|| session.detected_at.timestamp_millis()),
            session
                .message
                .clone()
                .unwrap_or_else(|| "Session revoked".to_string()),
        )
    }
}

/// A revocation flowing through the bridge.
///
/// The detected and simulated shapes are kept apart: a detected revocation
/// carries the partial session it came from, a simulated one only the
/// notice its caller supplied.
#[derive(Debug, Clone, PartialEq)]
pub enum RevocationEvent {
    /// Raised by the session poller.
    Detected {
        /// The partial session built from the status response.
        session: RevokedSession,
        /// The payload handed to listeners.
        notice: RevocationNotice,
    },
    /// Raised by the simulation harness.
    Simulated(RevocationNotice),
}

impl RevocationEvent {
    /// Wrap a detected revocation, deriving its notice.
    pub fn detected(session: RevokedSession) -> Self {
        let notice = RevocationNotice::from_revoked(&session);
        Self::Detected { session, notice }
    }

    /// The payload handed to listeners.
    pub fn notice(&self) -> &RevocationNotice {
        match self {
            Self::Detected { notice, .. } => notice,
            Self::Simulated(notice) => notice,
        }
    }

    /// The broadcast event name.
    pub fn name(&self) -> &'static str {
        SESSION_REVOKED_EVENT
    }

    /// Whether this event came from the simulation harness.
    pub fn is_simulated(&self) -> bool {
        matches!(self, Self::Simulated(_))
    }
}

/// Current time in epoch milliseconds.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_wire_shape() {
        let notice = RevocationNotice::new(
            SESSION_REVOKED_CODE,
            RevocationReason::Replaced,
            Some("jti-1".to_string()),
            1_700_000_000_000,
            "Session révoquée",
        );
        let json = serde_json::to_value(&notice).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "success": false,
                "code": "SESSION_REVOKED",
                "reason": "replaced",
                "replacedBy": "jti-1",
                "revokedAt": 1_700_000_000_000i64,
                "error": "Session révoquée"
            })
        );
    }

    #[test]
    fn test_detected_notice_falls_back_to_detection_time() {
        let detected_at = Utc::now();
        let session = RevokedSession {
            uid: "u1".to_string(),
            reason: RevocationReason::RevokedByAdmin,
            replaced_by: None,
            revoked_at: None,
            message: None,
            jti: None,
            detected_at,
        };
        let event = RevocationEvent::detected(session);
        assert!(!event.is_simulated());
        assert_eq!(event.name(), "sessionRevoked");
        assert_eq!(event.notice().revoked_at, detected_at.timestamp_millis());
        assert!(!event.notice().success);
        assert_eq!(event.notice().reason, RevocationReason::RevokedByAdmin);
    }
}
