//! Result type alias for console operations.

use super::console_error::ConsoleError;
use super::context::ErrorContext;

/// Type alias for Results using ConsoleError.
pub type ConsoleResult<T> = Result<T, ConsoleError>;

/// Extension trait for Result types to add context to errors.
pub trait ResultExt<T> {
    /// Add context to an error if the result is Err.
    fn context(self, ctx: ErrorContext) -> ConsoleResult<T>;

    /// Add context using a closure (only called on error).
    fn with_context<F>(self, f: F) -> ConsoleResult<T>
    where
        F: FnOnce() -> ErrorContext;
}

impl<T> ResultExt<T> for ConsoleResult<T> {
    fn context(self, ctx: ErrorContext) -> ConsoleResult<T> {
        self.map_err(|e| e.with_context(ctx))
    }

    fn with_context<F>(self, f: F) -> ConsoleResult<T>
    where
        F: FnOnce() -> ErrorContext,
    {
        self.map_err(|e| e.with_context(f()))
    }
}
