//! Classification of session status responses.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use sessionwatch_core::events::SESSION_REVOKED_CODE;
use sessionwatch_core::types::{RevocationReason, RevokedSession, SessionInfo};

use crate::transport::StatusResponse;

/// What one status check observed.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckOutcome {
    /// `401` with `code == SESSION_REVOKED`.
    Revoked(RevokedSession),
    /// Success response carrying a session, passed through unchanged.
    Updated(SessionInfo),
    /// Success response without a session.
    NoSession,
    /// Anything else: other statuses, other 401 codes, unparseable bodies.
    Ignored {
        /// HTTP status of the ignored response.
        status: u16,
    },
}

impl CheckOutcome {
    /// Short label for logs and CLI output.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Revoked(_) => "revoked",
            Self::Updated(_) => "updated",
            Self::NoSession => "no_session",
            Self::Ignored { .. } => "ignored",
        }
    }
}

/// Body of a successful status response.
#[derive(Debug, Deserialize)]
struct StatusBody {
    #[serde(default)]
    session: Option<serde_json::Value>,
}

/// Body of a `401` status response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UnauthorizedBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    replaced_by: Option<String>,
    #[serde(default)]
    revoked_at: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    jti: Option<String>,
}

impl UnauthorizedBody {
    fn is_revocation(&self) -> bool {
        self.code.as_deref() == Some(SESSION_REVOKED_CODE)
    }

    fn into_revoked(self, uid: &str) -> RevokedSession {
        RevokedSession {
            uid: uid.to_string(),
            reason: self
                .reason
                .map(RevocationReason::from)
                .unwrap_or(RevocationReason::Unspecified),
            replaced_by: self.replaced_by,
            revoked_at: self.revoked_at.as_ref().and_then(epoch_millis),
            message: self.error.or(self.message),
            jti: self.jti,
            detected_at: Utc::now(),
        }
    }
}

/// Accept `revokedAt` as epoch milliseconds or an RFC 3339 string.
fn epoch_millis(value: &serde_json::Value) -> Option<i64> {
    match value {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.timestamp_millis()),
        _ => None,
    }
}

/// Classify a status response for the user `uid`.
pub fn interpret(uid: &str, response: &StatusResponse) -> CheckOutcome {
    match response.status {
        401 => match serde_json::from_str::<UnauthorizedBody>(&response.body) {
            Ok(body) if body.is_revocation() => CheckOutcome::Revoked(body.into_revoked(uid)),
            Ok(body) => {
                tracing::debug!(code = ?body.code, "Unauthorized status without revocation code");
                CheckOutcome::Ignored { status: 401 }
            }
            Err(e) => {
                tracing::debug!(error = %e, "Unparseable unauthorized body");
                CheckOutcome::Ignored { status: 401 }
            }
        },
        200..=299 => match serde_json::from_str::<StatusBody>(&response.body) {
            Ok(StatusBody {
                session: Some(raw),
            }) => match SessionInfo::from_value(raw) {
                Some(session) => {
                    if !session.is_consistent() {
                        tracing::warn!(
                            uid = ?session.uid,
                            "Revoked session reported without a reason"
                        );
                    }
                    CheckOutcome::Updated(session)
                }
                None => {
                    tracing::debug!(status = response.status, "Session field is not an object");
                    CheckOutcome::Ignored {
                        status: response.status,
                    }
                }
            },
            Ok(StatusBody { session: None }) => CheckOutcome::NoSession,
            Err(e) => {
                tracing::debug!(status = response.status, error = %e, "Unparseable status body");
                CheckOutcome::Ignored {
                    status: response.status,
                }
            }
        },
        status => CheckOutcome::Ignored { status },
    }
}
