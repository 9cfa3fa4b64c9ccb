//! Convenience result type alias for Codepage Hub.

use crate::error::AppError;

/// A specialized `Result` type for Codepage Hub operations.
pub type AppResult<T> = Result<T, AppError>;
