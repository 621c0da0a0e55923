//! Context attached to errors for logging.

use chrono::{DateTime, Utc};

/// Where and when an error happened.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorContext {
    /// The operation that failed, e.g. `"delete_conversation"`.
    pub operation: String,
    /// Conversation the operation was acting on, if any.
    pub conversation_id: Option<String>,
    /// When the error was recorded.
    pub timestamp: DateTime<Utc>,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            conversation_id: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_conversation_id(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }

    /// Key=value rendering used in log lines.
    pub fn to_log_string(&self) -> String {
        let mut parts = vec![format!("operation={}", self.operation)];
        if let Some(ref id) = self.conversation_id {
            parts.push(format!("conversation_id={}", id));
        }
        parts.push(format!("timestamp={}", self.timestamp.to_rfc3339()));
        parts.join(" ")
    }
}

impl std::fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.conversation_id {
            Some(ref id) => write!(f, "{} (conversation {})", self.operation, id),
            None => write!(f, "{}", self.operation),
        }
    }
}
