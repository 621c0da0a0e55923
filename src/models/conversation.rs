use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::text_utils::DEFAULT_CONVERSATION_TITLE;
use super::{deserialize_id, deserialize_lenient_timestamp, deserialize_nullable_string};

/// `lastMessage` placeholder the backend uses for empty conversations.
pub const NO_MESSAGES_PLACEHOLDER: &str = "No messages yet";

/// Conversation summary as returned by the list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServerConversation {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub title: String,
    #[serde(default)]
    pub message_count: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_lenient_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_lenient_timestamp")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub last_message: String,
}

/// A conversation in the local list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Conversation {
    pub id: String,
    pub title: String,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub message_count: u32,
    pub last_message: String,
    /// The local title has not reached the backend yet.
    #[serde(default)]
    pub title_sync_pending: bool,
}

impl Conversation {
    /// Fresh local record for a conversation the backend just created.
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            title: DEFAULT_CONVERSATION_TITLE.to_string(),
            started_at: now,
            updated_at: now,
            message_count: 0,
            last_message: DEFAULT_CONVERSATION_TITLE.to_string(),
            title_sync_pending: false,
        }
    }

    /// True when the backend reported no messages at all.
    pub fn is_empty(&self) -> bool {
        self.message_count == 0 && self.last_message == NO_MESSAGES_PLACEHOLDER
    }

    /// Count new messages; the counter only ever grows.
    pub fn record_messages(&mut self, added: u32, last_message: &str) {
        self.message_count = self.message_count.saturating_add(added);
        self.last_message = last_message.to_string();
        self.updated_at = Utc::now();
    }
}

impl From<ServerConversation> for Conversation {
    fn from(server: ServerConversation) -> Self {
        let started_at = server.started_at.unwrap_or_else(Utc::now);
        let title = if server.title.trim().is_empty() {
            DEFAULT_CONVERSATION_TITLE.to_string()
        } else {
            server.title
        };

        Self {
            id: server.id,
            title,
            started_at,
            updated_at: server.updated_at.unwrap_or(started_at),
            message_count: server.message_count.unwrap_or(0),
            last_message: server.last_message,
            title_sync_pending: false,
        }
    }
}
