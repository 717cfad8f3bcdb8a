//! Convenience result type alias for SessionWatch.

use crate::error::AppError;

/// A specialized `Result` type for SessionWatch operations.
pub type AppResult<T> = Result<T, AppError>;
