//! Session data model as reported by the backend status endpoint.
//!
//! [`SessionInfo`] is relayed exactly as received: timestamps stay as the
//! ISO-8601 strings the server produced and unknown fields are kept in
//! [`SessionInfo::extra`]. [`RevokedSession`] is the partial record built
//! when the endpoint answers `401 SESSION_REVOKED`, which carries far less.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a server-side session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SessionStatus {
    /// The session is valid.
    Active,
    /// The session was invalidated server-side.
    Revoked,
    /// Any other server-defined status, kept verbatim.
    Other(String),
}

impl SessionStatus {
    /// String form used on the wire.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => "active",
            Self::Revoked => "revoked",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for SessionStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "active" => Self::Active,
            "revoked" => Self::Revoked,
            _ => Self::Other(value),
        }
    }
}

impl From<SessionStatus> for String {
    fn from(status: SessionStatus) -> Self {
        match status {
            SessionStatus::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a session was revoked.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RevocationReason {
    /// An administrator revoked the session.
    RevokedByAdmin,
    /// A newer login replaced this session.
    Replaced,
    /// The session outlived its validity window.
    Expired,
    /// The backend did not say.
    Unspecified,
    /// Any other reason code, kept verbatim.
    Other(String),
}

impl RevocationReason {
    /// String code used on the wire.
    pub fn as_str(&self) -> &str {
        match self {
            Self::RevokedByAdmin => "revoked_by_admin",
            Self::Replaced => "replaced",
            Self::Expired => "expired",
            Self::Unspecified => "unspecified",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for RevocationReason {
    fn from(value: String) -> Self {
        match value.as_str() {
            "revoked_by_admin" => Self::RevokedByAdmin,
            "replaced" => Self::Replaced,
            "expired" => Self::Expired,
            "unspecified" => Self::Unspecified,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for RevocationReason {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<RevocationReason> for String {
    fn from(reason: RevocationReason) -> Self {
        match reason {
            RevocationReason::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for RevocationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full session record returned by a successful status check.
///
/// Every modelled field is optional so that any session object the server
/// sends is relayed, even one missing fields or typing them differently.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    /// Owning user identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    /// Current status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SessionStatus>,
    /// Revocation reason code, populated when `status` is revoked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Opaque device description, usually a string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_info: Option<serde_json::Value>,
    /// Creation time as sent by the server (ISO-8601).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Last activity time as sent by the server (ISO-8601).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_activity: Option<String>,
    /// Session/token identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
    /// Server fields this client does not model.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl SessionInfo {
    /// Build from a raw `session` value. Returns `None` for non-objects.
    ///
    /// An object whose known fields have unexpected types is kept whole in
    /// `extra`, so it still serializes back to the same JSON.
    pub fn from_value(value: serde_json::Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        match serde_json::from_value::<Self>(value.clone()) {
            Ok(info) => Some(info),
            Err(_) => match value {
                serde_json::Value::Object(extra) => Some(Self {
                    extra,
                    ..Self::default()
                }),
                _ => None,
            },
        }
    }

    /// Whether the session is active.
    pub fn is_active(&self) -> bool {
        self.status == Some(SessionStatus::Active)
    }

    /// Parsed revocation reason, if the server sent one.
    pub fn revocation_reason(&self) -> Option<RevocationReason> {
        self.reason.as_deref().map(RevocationReason::from)
    }

    /// Parsed `createdAt`; `None` when absent or not RFC 3339.
    pub fn created_at_parsed(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(self.created_at.as_deref())
    }

    /// Parsed `lastActivity`; `None` when absent or not RFC 3339.
    pub fn last_activity_parsed(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(self.last_activity.as_deref())
    }

    /// A revoked record must say why.
    pub fn is_consistent(&self) -> bool {
        self.status != Some(SessionStatus::Revoked)
            || self.reason.as_deref().is_some_and(|r| !r.is_empty())
    }
}

fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Partial session record derived from a `401 SESSION_REVOKED` response.
///
/// Only the fields the revocation response actually provides are present;
/// nothing is filled with placeholders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevokedSession {
    /// The watched user.
    pub uid: String,
    /// Why the session ended. Always populated.
    pub reason: RevocationReason,
    /// Identifier of the session that replaced this one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replaced_by: Option<String>,
    /// Server-side revocation time in epoch milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoked_at: Option<i64>,
    /// Human-readable message from the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Identifier of the revoked token, when echoed back.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
    /// When this client observed the revocation.
    pub detected_at: DateTime<Utc>,
}

impl RevokedSession {
    /// A revoked session always reports [`SessionStatus::Revoked`].
    pub fn status(&self) -> SessionStatus {
        SessionStatus::Revoked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> serde_json::Value {
        serde_json::json!({
            "uid": "user-42",
            "status": "active",
            "deviceInfo": "Firefox on Linux",
            "createdAt": "2024-03-01T10:00:00.000Z",
            "lastActivity": "2024-03-01T10:05:00.000Z",
            "jti": "jti-abc",
            "ipAddress": "10.0.0.7"
        })
    }

    #[test]
    fn test_session_info_passthrough_preserves_fields() {
        let raw = sample_json();
        let info: SessionInfo = serde_json::from_value(raw.clone()).unwrap();
        assert!(info.is_active());
        assert_eq!(info.extra.get("ipAddress").unwrap(), "10.0.0.7");
        assert_eq!(serde_json::to_value(&info).unwrap(), raw);
    }

    #[test]
    fn test_timestamps_parse_lazily() {
        let info: SessionInfo = serde_json::from_value(sample_json()).unwrap();
        let created = info.created_at_parsed().unwrap();
        assert_eq!(created.to_rfc3339(), "2024-03-01T10:00:00+00:00");

        let mut odd = info.clone();
        odd.last_activity = Some("yesterday".to_string());
        assert!(odd.last_activity_parsed().is_none());
        assert_eq!(odd.last_activity.as_deref(), Some("yesterday"));
    }

    #[test]
    fn test_unknown_status_roundtrips() {
        let status: SessionStatus = serde_json::from_str("\"suspended\"").unwrap();
        assert_eq!(status, SessionStatus::Other("suspended".to_string()));
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"suspended\"");
    }

    #[test]
    fn test_revoked_without_reason_is_inconsistent() {
        let mut info: SessionInfo = serde_json::from_value(sample_json()).unwrap();
        info.status = Some(SessionStatus::Revoked);
        assert!(!info.is_consistent());
        info.reason = Some("revoked_by_admin".to_string());
        assert!(info.is_consistent());
        assert_eq!(
            info.revocation_reason(),
            Some(RevocationReason::RevokedByAdmin)
        );
    }

    #[test]
    fn test_reason_codes() {
        assert_eq!(RevocationReason::from("replaced"), RevocationReason::Replaced);
        assert_eq!(
            RevocationReason::from(""),
            RevocationReason::Other(String::new())
        );
        assert_eq!(String::from(RevocationReason::from("")), "");
        assert_eq!(
            RevocationReason::from("password_changed").as_str(),
            "password_changed"
        );
    }

    #[test]
    fn test_partial_session_is_kept() {
        let raw = serde_json::json!({"status": "active", "jti": "j1"});
        let info = SessionInfo::from_value(raw.clone()).unwrap();
        assert!(info.uid.is_none());
        assert!(info.is_active());
        assert_eq!(serde_json::to_value(&info).unwrap(), raw);
    }

    #[test]
    fn test_structured_device_info_is_kept() {
        let raw = serde_json::json!({
            "uid": "u1",
            "status": "active",
            "deviceInfo": {"ua": "Chrome", "os": "macOS"}
        });
        let info = SessionInfo::from_value(raw.clone()).unwrap();
        assert_eq!(info.device_info.as_ref().unwrap()["ua"], "Chrome");
        assert_eq!(serde_json::to_value(&info).unwrap(), raw);
    }

    #[test]
    fn test_mistyped_fields_fall_back_to_extra() {
        let raw = serde_json::json!({"uid": 42, "status": "active", "createdAt": 1700000000});
        let info = SessionInfo::from_value(raw.clone()).unwrap();
        assert!(info.uid.is_none());
        assert_eq!(info.extra.get("uid").unwrap(), 42);
        assert_eq!(serde_json::to_value(&info).unwrap(), raw);
    }

    #[test]
    fn test_non_object_session_rejected() {
        assert!(SessionInfo::from_value(serde_json::json!("abc")).is_none());
        assert!(SessionInfo::from_value(serde_json::Value::Null).is_none());
    }
}
