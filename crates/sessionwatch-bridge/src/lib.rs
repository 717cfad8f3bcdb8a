//! # sessionwatch-bridge
//!
//! Application-wide channel for session revocation notices. Provides:
//!
//! - An ordered listener registry invoked synchronously on every emission
//! - A `tokio::sync::broadcast` subscription for async consumers
//! - Emission counters
//! - A simulation harness that emits test revocations
//!
//! The bridge is an ordinary value owned by the application's composition
//! root and shared by `Arc`; there is no process-global instance.

pub mod audit;
pub mod event_bridge;
pub mod listener;
pub mod metrics;
pub mod simulate;

pub use event_bridge::RevocationBridge;
pub use listener::RevocationListener;
pub use metrics::BridgeMetrics;
pub use simulate::{SimulationSpec, simulate_revocation};
