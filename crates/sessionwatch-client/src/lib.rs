//! # sessionwatch-client
//!
//! Client side of the session-liveness subsystem:
//!
//! - [`transport`]: credentialed `GET` against the session status endpoint
//! - [`interpret`]: classification of status responses
//! - [`poller`]: the interval-driven [`SessionPoller`]
//! - [`observer`]: callback seams, including the bridge forwarder
//! - [`auth`]: the auth context the poller follows
//! - [`directory`]: read-only user directory queries for the role report

pub mod auth;
pub mod directory;
pub mod interpret;
pub mod observer;
pub mod poller;
pub mod transport;

pub use auth::{AuthContext, follow_auth_context, spawn_follower};
pub use directory::{FirestoreDirectory, RoleReport, UserDirectory, UserRecord, role_report};
pub use interpret::{CheckOutcome, interpret};
pub use observer::{BridgeObserver, FnObserver, SessionObserver};
pub use poller::SessionPoller;
pub use transport::{HttpStatusTransport, StatusResponse, StatusTransport};
