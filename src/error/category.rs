//! Error category classification.
//!
//! Categories drive the decision the chat layer has to make for every
//! failure: show a notice and carry on, retry later, or ask the user to fix
//! their setup.

use std::fmt;

/// High-level categorization of errors for handling decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Connection, DNS or timeout problems. Transient.
    Network,

    /// The backend answered with a 5xx or reported `success: false`.
    Server,

    /// The backend sent something we could not understand.
    Protocol,

    /// The user has to act (bad input, expired token).
    User,

    /// Missing or malformed configuration.
    Configuration,

    /// The operation was cancelled locally.
    Cancelled,
}

impl ErrorCategory {
    /// Returns true if errors in this category are generally transient.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCategory::Network | ErrorCategory::Server)
    }

    /// Short label for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "network",
            ErrorCategory::Server => "server",
            ErrorCategory::Protocol => "protocol",
            ErrorCategory::User => "user",
            ErrorCategory::Configuration => "configuration",
            ErrorCategory::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
