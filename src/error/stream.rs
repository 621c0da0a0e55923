//! Streaming-related error types.
//!
//! These errors end a reply stream. Individual malformed records are
//! reported as [`crate::sse::FrameParseError`] and only become a
//! `StreamError` once too many arrive back to back.

use thiserror::Error;

/// Stream-specific error variants.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StreamError {
    /// The body broke off while reading.
    #[error("Stream connection lost: {message}")]
    ConnectionLost { message: String },

    /// The backend sent an `error` frame.
    #[error("Backend error: {message}")]
    BackendError { message: String },

    /// The body ended before a `final` or `error` frame arrived.
    #[error("Stream ended without a terminal frame")]
    MissingTerminalFrame,

    /// Too many consecutive records failed to parse.
    #[error("{count} consecutive malformed frames (last: {last_error})")]
    TooManyMalformedFrames { count: usize, last_error: String },

    /// The stream was abandoned locally.
    #[error("Stream cancelled")]
    Cancelled,
}

impl StreamError {
    /// Check if this error is likely transient and can be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StreamError::ConnectionLost { .. } | StreamError::MissingTerminalFrame
        )
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            StreamError::ConnectionLost { .. } => {
                "The connection dropped while the reply was arriving.".to_string()
            }
            StreamError::BackendError { message } => message.clone(),
            StreamError::MissingTerminalFrame => {
                "The reply ended unexpectedly. Please try again.".to_string()
            }
            StreamError::TooManyMalformedFrames { .. } => {
                "Received invalid data from the server. Please try again.".to_string()
            }
            StreamError::Cancelled => "The reply was cancelled.".to_string(),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            StreamError::ConnectionLost { .. } => "E_STREAM_LOST",
            StreamError::BackendError { .. } => "E_STREAM_BACKEND",
            StreamError::MissingTerminalFrame => "E_STREAM_UNTERMINATED",
            StreamError::TooManyMalformedFrames { .. } => "E_STREAM_MALFORMED",
            StreamError::Cancelled => "E_STREAM_CANCEL",
        }
    }
}
