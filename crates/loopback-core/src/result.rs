//! Convenience result type alias for the SDK.

use crate::error::AppError;

/// A specialized `Result` type for SDK operations.
///
/// The `Ok` arm is the success signal of an operation and the `Err` arm its
/// failure signal; a call resolves to exactly one of them.
pub type AppResult<T> = Result<T, AppError>;
