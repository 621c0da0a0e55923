//! Errors in the JSON envelope returned by the chatbot endpoints.

use thiserror::Error;

/// The request went through but the answer was not usable.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    /// The backend answered `success: false`.
    #[error("{endpoint} rejected the request: {message}")]
    Rejected { endpoint: String, message: String },

    /// `success: true` but the `data` field we need is missing.
    #[error("{endpoint} returned no data")]
    MissingData { endpoint: String },

    /// The body is not the JSON we expected.
    #[error("{endpoint} returned malformed JSON: {message}")]
    Decode { endpoint: String, message: String },
}

impl ApiError {
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Rejected { message, .. } if !message.is_empty() => message.clone(),
            _ => "The server returned an unexpected answer. Please try again.".to_string(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Rejected { .. } => "E_API_REJECTED",
            ApiError::MissingData { .. } => "E_API_NO_DATA",
            ApiError::Decode { .. } => "E_API_DECODE",
        }
    }
}
