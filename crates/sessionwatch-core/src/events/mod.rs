//! Events raised by the session-liveness subsystem.

pub mod revocation;

pub use revocation::{
    RevocationEvent, RevocationNotice, SESSION_REVOKED_CODE, SESSION_REVOKED_EVENT, now_millis,
};
