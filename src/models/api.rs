//! Request and response bodies of the chatbot endpoints.

use serde::{Deserialize, Serialize};

use super::{deserialize_id, ServerMessage};

/// `{ success, data?, message? }` wrapper every JSON endpoint uses.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

/// `data` of the create endpoint.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreatedConversation {
    #[serde(deserialize_with = "deserialize_id")]
    pub conversation_id: String,
}

/// `data` of the history endpoint.
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
pub struct ConversationHistory {
    #[serde(default)]
    pub messages: Vec<ServerMessage>,
}

/// `data` of the cleanup endpoint.
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CleanupResult {
    #[serde(default)]
    pub deleted_count: u32,
}

/// Body of the send endpoint.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub conversation_id: String,
    pub message: String,
}

/// Body of the save endpoint.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SaveMessageRequest {
    pub role: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
}

/// Body of the rename endpoint.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UpdateTitleRequest {
    pub title: String,
}
