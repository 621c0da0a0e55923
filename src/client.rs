//! Typed client for the chatbot REST and streaming endpoints.
//!
//! | Operation | Request |
//! |-----------|---------|
//! | create | `POST /chatbot/conversations` |
//! | history | `GET /chatbot/conversations/{id}/history` |
//! | list | `GET /chatbot/conversations` |
//! | rename | `PUT /chatbot/conversations/{id}/title` |
//! | delete | `DELETE /chatbot/conversations/{id}` |
//! | send | `POST /chatbot/chat` (event stream) |
//! | save | `POST /chatbot/conversations/{id}/messages` |
//! | cleanup | `DELETE /chatbot/conversations/cleanup/empty` |

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{
    classify_http_error, ApiError, ErrorContext, FbotError, FbotResult, NetworkError, ResultExt,
};
use crate::models::{
    ApiEnvelope, CleanupResult, ConversationHistory, CreatedConversation, MessageKind,
    SaveMessageRequest, SendMessageRequest, ServerConversation, ServerMessage, UpdateTitleRequest,
};
use crate::session::SessionContext;
use crate::sse::{frame_stream, FrameStream};
use crate::traits::{HttpClient, Response};

/// Result of a delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The backend answered 404; the conversation is gone either way.
    AlreadyGone,
}

/// Chatbot API client, generic over the HTTP transport.
pub struct ChatApiClient<C: HttpClient> {
    http: C,
    base_url: String,
    session: SessionContext,
    malformed_frame_limit: usize,
}

impl<C: HttpClient> ChatApiClient<C> {
    /// Client for the URL and frame limit in `config`.
    pub fn new(http: C, config: &ClientConfig, session: SessionContext) -> Self {
        Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            session,
            malformed_frame_limit: config.malformed_frame_limit,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SessionContext {
        &mut self.session
    }

    /// POST /chatbot/conversations
    ///
    /// Returns the id of the new conversation.
    pub async fn create_conversation(&self) -> FbotResult<String> {
        const OP: &str = "create_conversation";
        let url = self.url("/chatbot/conversations");
        debug!(%url, "creating conversation");

        let response = self
            .http
            .post(&url, "{}", &self.session.auth_headers())
            .await
            .map_err(|e| classify_http_error(&e, &url))
            .context(ErrorContext::new(OP))?;
        let created: CreatedConversation =
            require_data(&response, OP).context(ErrorContext::new(OP))?;
        Ok(created.conversation_id)
    }

    /// GET /chatbot/conversations/{id}/history
    pub async fn conversation_history(&self, conversation_id: &str) -> FbotResult<Vec<ServerMessage>> {
        const OP: &str = "conversation_history";
        let url = self.conversation_url(conversation_id, "/history");
        let ctx = || ErrorContext::new(OP).with_conversation_id(conversation_id);

        let response = self
            .http
            .get(&url, &self.session.auth_headers())
            .await
            .map_err(|e| classify_http_error(&e, &url))
            .with_context(ctx)?;
        let history: Option<ConversationHistory> = read_envelope(&response, OP).with_context(ctx)?;
        Ok(history.map(|h| h.messages).unwrap_or_default())
    }

    /// GET /chatbot/conversations
    pub async fn user_conversations(&self) -> FbotResult<Vec<ServerConversation>> {
        const OP: &str = "user_conversations";
        let url = self.url("/chatbot/conversations");

        let response = self
            .http
            .get(&url, &self.session.auth_headers())
            .await
            .map_err(|e| classify_http_error(&e, &url))
            .context(ErrorContext::new(OP))?;
        let list: Option<Vec<ServerConversation>> =
            read_envelope(&response, OP).context(ErrorContext::new(OP))?;
        Ok(list.unwrap_or_default())
    }

    /// PUT /chatbot/conversations/{id}/title
    pub async fn update_conversation_title(&self, conversation_id: &str, title: &str) -> FbotResult<()> {
        const OP: &str = "update_conversation_title";
        let url = self.conversation_url(conversation_id, "/title");
        let ctx = || ErrorContext::new(OP).with_conversation_id(conversation_id);
        let body = to_json(&UpdateTitleRequest {
            title: title.to_string(),
        })?;

        let response = self
            .http
            .put(&url, &body, &self.session.auth_headers())
            .await
            .map_err(|e| classify_http_error(&e, &url))
            .with_context(ctx)?;
        require_ack(&response, OP).with_context(ctx)
    }

    /// DELETE /chatbot/conversations/{id}
    ///
    /// A 404 is reported as [`DeleteOutcome::AlreadyGone`], not an error.
    pub async fn delete_conversation(&self, conversation_id: &str) -> FbotResult<DeleteOutcome> {
        const OP: &str = "delete_conversation";
        let url = self.conversation_url(conversation_id, "");
        let ctx = || ErrorContext::new(OP).with_conversation_id(conversation_id);

        let response = self
            .http
            .delete(&url, &self.session.auth_headers())
            .await
            .map_err(|e| classify_http_error(&e, &url))
            .with_context(ctx)?;

        if response.status == 404 {
            debug!(conversation_id, "conversation already gone");
            return Ok(DeleteOutcome::AlreadyGone);
        }
        require_ack(&response, OP).with_context(ctx)?;
        Ok(DeleteOutcome::Deleted)
    }

    /// POST /chatbot/chat
    ///
    /// Returns the reply as a stream of frames tied to `cancel`.
    pub async fn send_message(
        &self,
        conversation_id: &str,
        message: &str,
        cancel: CancellationToken,
    ) -> FbotResult<FrameStream> {
        const OP: &str = "send_message";
        let url = self.url("/chatbot/chat");
        let ctx = || ErrorContext::new(OP).with_conversation_id(conversation_id);
        let body = to_json(&SendMessageRequest {
            conversation_id: conversation_id.to_string(),
            message: message.to_string(),
        })?;
        debug!(conversation_id, "streaming reply");

        let stream = self
            .http
            .post_stream(&url, &body, &self.session.auth_headers())
            .await
            .map_err(|e| classify_http_error(&e, &url))
            .with_context(ctx)?;
        Ok(frame_stream(stream, cancel, self.malformed_frame_limit))
    }

    /// POST /chatbot/conversations/{id}/messages
    pub async fn save_message(
        &self,
        conversation_id: &str,
        kind: MessageKind,
        content: &str,
        agent: Option<&str>,
    ) -> FbotResult<()> {
        const OP: &str = "save_message";
        let url = self.conversation_url(conversation_id, "/messages");
        let ctx = || ErrorContext::new(OP).with_conversation_id(conversation_id);
        let body = to_json(&SaveMessageRequest {
            role: kind.as_role().to_string(),
            content: content.to_string(),
            agent: agent.map(str::to_string),
        })?;

        let response = self
            .http
            .post(&url, &body, &self.session.auth_headers())
            .await
            .map_err(|e| classify_http_error(&e, &url))
            .with_context(ctx)?;
        require_ack(&response, OP).with_context(ctx)
    }

    /// DELETE /chatbot/conversations/cleanup/empty
    ///
    /// Returns how many conversations the backend removed.
    pub async fn cleanup_empty_conversations(&self) -> FbotResult<u32> {
        const OP: &str = "cleanup_empty_conversations";
        let url = self.url("/chatbot/conversations/cleanup/empty");

        let response = self
            .http
            .delete(&url, &self.session.auth_headers())
            .await
            .map_err(|e| classify_http_error(&e, &url))
            .context(ErrorContext::new(OP))?;
        let result: Option<CleanupResult> =
            read_envelope(&response, OP).context(ErrorContext::new(OP))?;
        Ok(result.map(|r| r.deleted_count).unwrap_or(0))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `/chatbot/conversations/{id}{suffix}` with the id as one path segment.
    fn conversation_url(&self, conversation_id: &str, suffix: &str) -> String {
        self.url(&format!(
            "/chatbot/conversations/{}{}",
            urlencoding::encode(conversation_id),
            suffix
        ))
    }
}

fn to_json<T: Serialize>(value: &T) -> FbotResult<String> {
    serde_json::to_string(value).map_err(|e| {
        FbotError::from(NetworkError::Other {
            message: format!("failed to encode request: {}", e),
        })
    })
}

fn status_error(response: &Response) -> NetworkError {
    let message = response
        .text()
        .ok()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| "Unknown error".to_string());
    NetworkError::HttpStatus {
        status: response.status,
        message,
    }
}

/// Check the status and decode the envelope, returning its `data`.
fn read_envelope<T: DeserializeOwned>(response: &Response, endpoint: &str) -> FbotResult<Option<T>> {
    if !response.is_success() {
        return Err(status_error(response).into());
    }
    let envelope: ApiEnvelope<T> = response.json().map_err(|e| ApiError::Decode {
        endpoint: endpoint.to_string(),
        message: e.to_string(),
    })?;
    if !envelope.success {
        return Err(ApiError::Rejected {
            endpoint: endpoint.to_string(),
            message: envelope.message.unwrap_or_default(),
        }
        .into());
    }
    Ok(envelope.data)
}

fn require_data<T: DeserializeOwned>(response: &Response, endpoint: &str) -> FbotResult<T> {
    read_envelope(response, endpoint)?.ok_or_else(|| {
        ApiError::MissingData {
            endpoint: endpoint.to_string(),
        }
        .into()
    })
}

/// Endpoints that only acknowledge: a 2xx is enough unless the body
/// explicitly says `success: false`.
fn require_ack(response: &Response, endpoint: &str) -> FbotResult<()> {
    if !response.is_success() {
        return Err(status_error(response).into());
    }
    let body: Option<serde_json::Value> = response.json().ok();
    let rejected = body
        .as_ref()
        .and_then(|b| b.get("success"))
        .and_then(|s| s.as_bool())
        == Some(false);
    if rejected {
        let message = body
            .as_ref()
            .and_then(|b| b.get("message"))
            .and_then(|m| m.as_str())
            .unwrap_or_default()
            .to_string();
        return Err(ApiError::Rejected {
            endpoint: endpoint.to_string(),
            message,
        }
        .into());
    }
    Ok(())
}
