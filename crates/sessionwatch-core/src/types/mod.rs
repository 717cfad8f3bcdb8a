//! Shared types used across SessionWatch crates.

pub mod id;
pub mod session;

pub use id::{ListenerId, WatchId};
pub use session::{RevocationReason, RevokedSession, SessionInfo, SessionStatus};
