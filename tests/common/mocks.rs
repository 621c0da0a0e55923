//! Mock backend configurations for integration tests.

pub use fbot::adapters::mock::{MockHttpClient, MockResponse, RecordedRequest};

use serde_json::{json, Value};

use super::url;

/// Builder that registers the chatbot endpoints on a [`MockHttpClient`].
pub struct MockBackend {
    client: MockHttpClient,
}

impl MockBackend {
    /// Every unmatched request answers `{"success": true}`.
    pub fn new() -> Self {
        let client = MockHttpClient::new();
        client.set_default_response(MockResponse::json(200, json!({"success": true})));
        Self { client }
    }

    /// POST /chatbot/conversations returns `id`.
    pub fn with_created(self, id: &str) -> Self {
        self.client.set_response(
            "POST",
            &url("/chatbot/conversations"),
            MockResponse::json(200, json!({"success": true, "data": {"conversationId": id}})),
        );
        self
    }

    /// GET /chatbot/conversations returns `conversations`.
    pub fn with_conversations(self, conversations: Value) -> Self {
        self.client.set_response(
            "GET",
            &url("/chatbot/conversations"),
            MockResponse::json(200, json!({"success": true, "data": conversations})),
        );
        self
    }

    /// GET history of `id` returns `messages`.
    pub fn with_history(self, id: &str, messages: Value) -> Self {
        self.client.set_response(
            "GET",
            &url(&format!("/chatbot/conversations/{}/history", id)),
            MockResponse::json(200, json!({"success": true, "data": {"messages": messages}})),
        );
        self
    }

    /// POST /chatbot/chat streams these `data:` records.
    pub fn with_reply(self, records: &[&str]) -> Self {
        self.client
            .set_response("POST", &url("/chatbot/chat"), MockResponse::events(records));
        self
    }

    /// Any method on `path` answers with `status` and `body`.
    pub fn with_status(self, method: &str, path: &str, status: u16, body: Value) -> Self {
        self.client
            .set_response(method, &url(path), MockResponse::json(status, body));
        self
    }

    /// Builds the configured MockHttpClient.
    pub fn build(self) -> MockHttpClient {
        self.client
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Conversation record as the list endpoint returns it.
pub fn server_conversation(id: &str, title: &str, count: u32, last_message: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "messageCount": count,
        "lastMessage": last_message,
        "updatedAt": "2024-05-01T10:00:00Z",
        "startedAt": "2024-05-01T09:00:00Z",
    })
}

/// Save-message requests recorded for a conversation.
pub fn saved_messages(mock: &MockHttpClient, id: &str) -> Vec<Value> {
    mock.requests_to("POST", &url(&format!("/chatbot/conversations/{}/messages", id)))
        .iter()
        .filter_map(RecordedRequest::json)
        .collect()
}
