//! Convenience result type alias for SpotLight.

use crate::error::AppError;

/// A specialized `Result` type for SpotLight operations.
pub type AppResult<T> = Result<T, AppError>;
