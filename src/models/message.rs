use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{deserialize_lenient_timestamp, deserialize_nullable_string};

/// Agent tag for the local-only greeting.
pub const WELCOME_AGENT: &str = "welcome";
/// Agent tag for the apology shown when a send fails.
pub const ERROR_AGENT: &str = "error";
/// Agent assumed for history records that carry none.
pub const GENERIC_AGENT: &str = "generic_agent";

/// Text of the synthetic reply appended when a send fails.
pub const APOLOGY_TEXT: &str = "Sorry, I ran into a problem while handling your request. \
Please try again or check your network connection.";

/// Who wrote a message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    User,
    Bot,
}

impl MessageKind {
    /// Role string used by the save-message endpoint.
    pub fn as_role(&self) -> &'static str {
        match self {
            MessageKind::User => "user",
            MessageKind::Bot => "bot",
        }
    }
}

/// A message in a conversation transcript.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// Locally generated identifier
    pub id: String,
    pub kind: MessageKind,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// Agent that produced a bot reply (`rag_agent`, `error`, ...)
    #[serde(default)]
    pub agent: Option<String>,
}

impl Message {
    fn new(kind: MessageKind, content: impl Into<String>, agent: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            content: content.into(),
            timestamp: Utc::now(),
            agent,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageKind::User, content, None)
    }

    pub fn bot(content: impl Into<String>, agent: Option<String>) -> Self {
        Self::new(MessageKind::Bot, content, agent)
    }

    /// The fixed apology reply.
    pub fn apology() -> Self {
        Self::bot(APOLOGY_TEXT, Some(ERROR_AGENT.to_string()))
    }

    /// Greeting shown when there is nothing else to show. Never persisted.
    pub fn welcome(user_name: Option<&str>) -> Self {
        let name = user_name.filter(|n| !n.trim().is_empty()).unwrap_or("there");
        let content = format!(
            "Hello {}! 👋 I'm FBot, your AI study assistant.\n\n\
             I can help you with:\n\
             - **Education advice** - schools, tuition and admissions\n\
             - **Task management** - create, edit and delete todos and schedules\n\
             - **Performance analysis** - progress reports and tips to improve\n\
             - **Information search** - web search and learning roadmaps\n\n\
             Tell me what you need!",
            name
        );
        Self::bot(content, Some(WELCOME_AGENT.to_string()))
    }

    pub fn is_user(&self) -> bool {
        self.kind == MessageKind::User
    }

    pub fn is_welcome(&self) -> bool {
        self.agent.as_deref() == Some(WELCOME_AGENT)
    }

    pub fn is_error(&self) -> bool {
        self.agent.as_deref() == Some(ERROR_AGENT)
    }
}

/// History record as stored by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerMessage {
    /// `"user"`, `"bot"`, `"assistant"`, ...
    pub role: String,
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub content: String,
    #[serde(default, deserialize_with = "deserialize_lenient_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub agent: Option<String>,
}

impl ServerMessage {
    /// Convert to the local shape. Anything that is not `user` is a bot
    /// message; a missing agent becomes [`GENERIC_AGENT`].
    pub fn to_client_message(self) -> Message {
        let kind = if self.role == "user" {
            MessageKind::User
        } else {
            MessageKind::Bot
        };
        let agent = match kind {
            MessageKind::User => self.agent,
            MessageKind::Bot => Some(self.agent.unwrap_or_else(|| GENERIC_AGENT.to_string())),
        };

        Message {
            id: Uuid::new_v4().to_string(),
            kind,
            content: self.content,
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
            agent,
        }
    }
}
