//! # sessionwatch-core
//!
//! Core crate for SessionWatch. Contains configuration schemas, typed
//! identifiers, the session data model, revocation event payloads, and the
//! unified error system.
//!
//! This crate has **no** internal dependencies on other SessionWatch crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
