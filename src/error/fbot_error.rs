//! Unified error type for the chat client.

use thiserror::Error;

use super::api::ApiError;
use super::category::ErrorCategory;
use super::config::ConfigError;
use super::context::ErrorContext;
use super::network::NetworkError;
use super::stream::StreamError;

/// Every failure the library can report.
#[derive(Debug, Error)]
pub enum FbotError {
    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Stream(#[from] StreamError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Wrapped error with additional context.
    #[error("{error} [{context}]")]
    WithContext {
        error: Box<FbotError>,
        context: ErrorContext,
    },
}

impl FbotError {
    /// Get the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            FbotError::Network(NetworkError::Cancelled) => ErrorCategory::Cancelled,
            FbotError::Network(NetworkError::InvalidResponse { .. }) => ErrorCategory::Protocol,
            FbotError::Network(NetworkError::HttpStatus { status, .. }) => match *status {
                401 | 403 => ErrorCategory::User,
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Protocol,
            },
            FbotError::Network(_) => ErrorCategory::Network,
            FbotError::Stream(err) => match err {
                StreamError::ConnectionLost { .. } => ErrorCategory::Network,
                StreamError::BackendError { .. } => ErrorCategory::Server,
                StreamError::MissingTerminalFrame
                | StreamError::TooManyMalformedFrames { .. } => ErrorCategory::Protocol,
                StreamError::Cancelled => ErrorCategory::Cancelled,
            },
            FbotError::Api(ApiError::Rejected { .. }) => ErrorCategory::Server,
            FbotError::Api(_) => ErrorCategory::Protocol,
            FbotError::Config(_) => ErrorCategory::Configuration,
            FbotError::WithContext { error, .. } => error.category(),
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            FbotError::Network(err) => err.is_retryable(),
            FbotError::Stream(err) => err.is_retryable(),
            FbotError::Api(_) | FbotError::Config(_) => false,
            FbotError::WithContext { error, .. } => error.is_retryable(),
        }
    }

    /// True when the backend answered 404.
    pub fn is_not_found(&self) -> bool {
        match self {
            FbotError::Network(err) => err.is_not_found(),
            FbotError::WithContext { error, .. } => error.is_not_found(),
            _ => false,
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            FbotError::Network(err) => err.user_message(),
            FbotError::Stream(err) => err.user_message(),
            FbotError::Api(err) => err.user_message(),
            FbotError::Config(err) => err.user_message(),
            FbotError::WithContext { error, .. } => error.user_message(),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            FbotError::Network(err) => err.error_code(),
            FbotError::Stream(err) => err.error_code(),
            FbotError::Api(err) => err.error_code(),
            FbotError::Config(err) => err.error_code(),
            FbotError::WithContext { error, .. } => error.error_code(),
        }
    }

    /// Attach context to this error.
    pub fn with_context(self, ctx: ErrorContext) -> Self {
        FbotError::WithContext {
            error: Box::new(self),
            context: ctx,
        }
    }

    /// Get the context if this error has one attached.
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            FbotError::WithContext { context, .. } => Some(context),
            _ => None,
        }
    }

    /// The error with any context layers removed.
    pub fn root(&self) -> &FbotError {
        match self {
            FbotError::WithContext { error, .. } => error.root(),
            other => other,
        }
    }
}
