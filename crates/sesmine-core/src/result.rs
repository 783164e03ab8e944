//! Convenience result type alias for SESMine.

use crate::error::AppError;

/// A specialized `Result` type for SESMine infrastructure operations.
pub type AppResult<T> = Result<T, AppError>;
