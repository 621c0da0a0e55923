//! Configuration errors.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    /// An environment variable held a value we could not parse.
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    /// A required setting was not provided.
    #[error("missing required setting {key}")]
    Missing { key: String },
}

impl ConfigError {
    pub fn user_message(&self) -> String {
        match self {
            ConfigError::InvalidValue { key, value, .. } => {
                format!("{} is set to '{}', which is not valid.", key, value)
            }
            ConfigError::Missing { key } => format!("Please set {} before running fbot.", key),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ConfigError::InvalidValue { .. } => "E_CFG_INVALID",
            ConfigError::Missing { .. } => "E_CFG_MISSING",
        }
    }
}
