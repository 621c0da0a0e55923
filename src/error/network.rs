//! Network-related error types.
//!
//! Everything that goes wrong between sending a request and getting a
//! usable response body ends up here.

use thiserror::Error;

use crate::traits::HttpError;

/// Network-specific error variants.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum NetworkError {
    /// Could not reach the server.
    #[error("Connection failed to '{url}': {message}")]
    ConnectionFailed { url: String, message: String },

    /// Request timed out.
    #[error("{operation} timed out")]
    Timeout { operation: String },

    /// Non-2xx response.
    #[error("HTTP {status} error: {message}")]
    HttpStatus { status: u16, message: String },

    /// The body could not be decoded into the expected shape.
    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    /// Request was cancelled.
    #[error("Request cancelled")]
    Cancelled,

    /// Anything else the transport reported.
    #[error("Network error: {message}")]
    Other { message: String },
}

impl NetworkError {
    /// Check if this error is likely transient and can be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            NetworkError::ConnectionFailed { .. } => true,
            NetworkError::Timeout { .. } => true,
            NetworkError::HttpStatus { status, .. } => {
                *status >= 500 || *status == 429 || *status == 408
            }
            NetworkError::InvalidResponse { .. } => false,
            NetworkError::Cancelled => false,
            NetworkError::Other { .. } => false,
        }
    }

    /// HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            NetworkError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for a 404 answer.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            NetworkError::ConnectionFailed { .. } => {
                "Unable to connect to the server. Please check your network connection.".to_string()
            }
            NetworkError::Timeout { operation } => {
                format!("The {} request timed out. Please try again.", operation)
            }
            NetworkError::HttpStatus { status, .. } => match *status {
                400 => "The request was invalid. Please try again.".to_string(),
                401 => "Your session has expired. Please sign in again.".to_string(),
                403 => "You don't have permission for this action.".to_string(),
                404 => "The conversation was not found.".to_string(),
                429 => "Too many requests. Please wait a moment and try again.".to_string(),
                500..=599 => "The server is having trouble. Please try again later.".to_string(),
                _ => format!("The server returned an error (HTTP {}).", status),
            },
            NetworkError::InvalidResponse { .. } => {
                "Received an unexpected response from the server.".to_string()
            }
            NetworkError::Cancelled => "The request was cancelled.".to_string(),
            NetworkError::Other { message } => format!("Network error: {}", message),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed { .. } => "E_NET_CONN",
            NetworkError::Timeout { .. } => "E_NET_TIMEOUT",
            NetworkError::HttpStatus { .. } => "E_NET_HTTP",
            NetworkError::InvalidResponse { .. } => "E_NET_INVALID",
            NetworkError::Cancelled => "E_NET_CANCEL",
            NetworkError::Other { .. } => "E_NET_OTHER",
        }
    }
}

/// Classify a transport-level [`HttpError`] for the request made to `url`.
pub fn classify_http_error(err: &HttpError, url: &str) -> NetworkError {
    match err {
        HttpError::ConnectionFailed(message) => NetworkError::ConnectionFailed {
            url: url.to_string(),
            message: message.clone(),
        },
        HttpError::Timeout(_) => NetworkError::Timeout {
            operation: operation_from_url(url),
        },
        HttpError::ServerError { status, message } => NetworkError::HttpStatus {
            status: *status,
            message: message.clone(),
        },
        HttpError::Cancelled => NetworkError::Cancelled,
        HttpError::Io(message) | HttpError::InvalidUrl(message) | HttpError::Other(message) => {
            NetworkError::Other {
                message: message.clone(),
            }
        }
    }
}

/// Last path segment of a URL, used to name the operation in timeouts.
fn operation_from_url(url: &str) -> String {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty() && !s.contains(':'))
        .unwrap_or("HTTP")
        .to_string()
}
