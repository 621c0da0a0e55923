//! Result alias and context helpers.

use super::context::ErrorContext;
use super::fbot_error::FbotError;

/// Type alias for Results using [`FbotError`].
pub type FbotResult<T> = Result<T, FbotError>;

/// Extension trait for attaching [`ErrorContext`] to results.
pub trait ResultExt<T> {
    /// Add context to an error if the result is Err.
    fn context(self, ctx: ErrorContext) -> FbotResult<T>;

    /// Add context built lazily, only on error.
    fn with_context<F>(self, f: F) -> FbotResult<T>
    where
        F: FnOnce() -> ErrorContext;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<FbotError>,
{
    fn context(self, ctx: ErrorContext) -> FbotResult<T> {
        self.map_err(|e| e.into().with_context(ctx))
    }

    fn with_context<F>(self, f: F) -> FbotResult<T>
    where
        F: FnOnce() -> ErrorContext,
    {
        self.map_err(|e| e.into().with_context(f()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NetworkError;

    #[test]
    fn test_context_on_ok_is_noop() {
        let result: Result<u32, NetworkError> = Ok(7);
        assert_eq!(result.context(ErrorContext::new("noop")).unwrap(), 7);
    }

    #[test]
    fn test_with_context_on_err() {
        let result: Result<(), NetworkError> = Err(NetworkError::Cancelled);
        let err = result
            .with_context(|| ErrorContext::new("send_message").with_conversation_id("c1"))
            .unwrap_err();
        assert_eq!(
            err.context().and_then(|c| c.conversation_id.as_deref()),
            Some("c1")
        );
    }
}
