//! Conversation lifecycle and the send/reply exchange.
//!
//! [`ChatSession`] owns the conversation list, the transcript of the
//! selected conversation and the notice queue. Backend failures never
//! escape it: they become notices, an apology message, or a stale-title
//! flag.

use futures::StreamExt;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::client::{ChatApiClient, DeleteOutcome};
use crate::config::ClientConfig;
use crate::error::{FbotError, StreamError};
use crate::models::{
    generate_conversation_title, Conversation, MessageKind, ServerMessage, ERROR_AGENT,
};
use crate::session::SessionContext;
use crate::sse::StreamFrame;
use crate::state::{ConversationList, ConversationPhase, Notices, Transcript};
use crate::traits::HttpClient;

/// Why a message was not sent.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SendError {
    #[error("message is empty")]
    EmptyMessage,

    /// Another reply is still streaming.
    #[error("a reply is still in progress")]
    Busy,

    /// No conversation was selected and creating one failed.
    #[error("could not start a conversation")]
    NoConversation,
}

/// How an accepted send ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    /// The reply was appended to the transcript.
    Replied { content: String },
    /// The apology message was appended instead of a reply.
    Apologized { reason: String },
    /// The reply was abandoned; nothing was appended for it.
    Cancelled,
}

enum ReplyResult {
    Final {
        content: String,
        agent: Option<String>,
    },
    BackendError(String),
    Failed(FbotError),
    Cancelled,
}

/// Client-side state of one signed-in user's chat.
pub struct ChatSession<C: HttpClient> {
    api: ChatApiClient<C>,
    conversations: ConversationList,
    transcript: Transcript,
    notices: Notices,
    /// Parent of every reply stream's token; replaced once cancelled.
    stream_token: CancellationToken,
    in_flight: bool,
}

impl<C: HttpClient> ChatSession<C> {
    pub fn new(http: C, config: &ClientConfig) -> Self {
        let session = SessionContext::init(config);
        Self::with_client(ChatApiClient::new(http, config, session), config.history_window)
    }

    pub fn with_client(api: ChatApiClient<C>, history_window: usize) -> Self {
        Self {
            api,
            conversations: ConversationList::new(),
            transcript: Transcript::new(history_window),
            notices: Notices::new(),
            stream_token: CancellationToken::new(),
            in_flight: false,
        }
    }

    pub fn api(&self) -> &ChatApiClient<C> {
        &self.api
    }

    pub fn conversations(&self) -> &ConversationList {
        &self.conversations
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn transcript_mut(&mut self) -> &mut Transcript {
        &mut self.transcript
    }

    pub fn notices(&self) -> &Notices {
        &self.notices
    }

    pub fn notices_mut(&mut self) -> &mut Notices {
        &mut self.notices
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.conversations.selected_id()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight
    }

    /// Token that aborts the reply currently streaming, if any.
    ///
    /// Cancelling it from another task makes the pending
    /// [`ChatSession::send_message`] return [`SendOutcome::Cancelled`].
    pub fn cancellation_handle(&mut self) -> CancellationToken {
        if self.stream_token.is_cancelled() {
            self.stream_token = CancellationToken::new();
        }
        self.stream_token.clone()
    }

    /// Abandon any in-flight reply and clear the busy state.
    pub fn cancel_stream(&mut self) {
        if self.in_flight {
            info!("cancelling in-flight reply");
        }
        self.stream_token.cancel();
        self.stream_token = CancellationToken::new();
        self.in_flight = false;
        self.transcript.set_loading(false);
    }

    fn user_name(&self) -> Option<String> {
        self.api.session().user_name().map(str::to_string)
    }

    fn show_welcome(&mut self) {
        let name = self.user_name();
        self.transcript.show_welcome(name.as_deref());
    }

    /// Fetch the conversation list and select the first conversation with
    /// messages. Shows the welcome greeting when there is nothing to select.
    pub async fn load_conversations(&mut self) -> bool {
        let Some(pick) = self.fetch_conversations().await else {
            return false;
        };
        self.apply_pick(pick).await;
        true
    }

    /// Fetch the conversation list but stay in the selected conversation.
    ///
    /// The selected conversation is kept listed even when the backend
    /// leaves it out for having no messages yet. Falls back to the
    /// automatic pick only when nothing is selected.
    pub async fn refresh_conversations(&mut self) -> bool {
        let current = self.conversations.selected().cloned();
        let Some(pick) = self.fetch_conversations().await else {
            return false;
        };
        match current {
            Some(conversation) => {
                if self.conversations.get(&conversation.id).is_none() {
                    self.conversations.prepend(conversation.clone());
                }
                self.conversations.select(&conversation.id);
            }
            None => self.apply_pick(pick).await,
        }
        true
    }

    async fn fetch_conversations(&mut self) -> Option<Option<String>> {
        match self.api.user_conversations().await {
            Ok(list) => {
                let pick = self.conversations.replace_from_server(list);
                info!(count = self.conversations.len(), "conversations loaded");
                Some(pick)
            }
            Err(err) => {
                warn!(error = %err, "failed to load conversations");
                self.notices
                    .error(format!("Could not load conversations: {}", err.user_message()));
                if self.transcript.is_empty() {
                    self.show_welcome();
                }
                None
            }
        }
    }

    async fn apply_pick(&mut self, pick: Option<String>) {
        match pick {
            Some(id) => {
                self.select_conversation(&id).await;
            }
            None => {
                self.cancel_stream();
                self.conversations.clear_selection();
                self.show_welcome();
            }
        }
    }

    /// Create a conversation, put it at the top of the list and select it.
    ///
    /// The new transcript is empty; no greeting is added.
    pub async fn create_conversation(&mut self) -> Option<String> {
        self.cancel_stream();
        match self.api.create_conversation().await {
            Ok(id) => {
                info!(conversation_id = %id, "conversation created");
                self.conversations.prepend(Conversation::new(id.clone()));
                self.conversations.select(&id);
                self.transcript.clear();
                Some(id)
            }
            Err(err) => {
                warn!(error = %err, "failed to create conversation");
                self.notices
                    .error(format!("Could not create a conversation: {}", err.user_message()));
                None
            }
        }
    }

    /// Select a conversation and load its history.
    ///
    /// An empty history or a failed fetch shows the welcome greeting.
    pub async fn select_conversation(&mut self, id: &str) -> bool {
        self.cancel_stream();
        if !self.conversations.select(id) {
            self.notices.error("That conversation no longer exists.");
            return false;
        }

        match self.api.conversation_history(id).await {
            Ok(records) if !records.is_empty() => {
                debug!(conversation_id = id, count = records.len(), "history loaded");
                let messages = records
                    .into_iter()
                    .map(ServerMessage::to_client_message)
                    .collect();
                self.transcript.replace(messages);
            }
            Ok(_) => self.show_welcome(),
            Err(err) => {
                warn!(conversation_id = id, error = %err, "failed to load history");
                self.show_welcome();
            }
        }
        true
    }

    /// Make sure `id` is listed locally. The backend list omits
    /// conversations without messages, so a known id may be missing.
    /// Removed conversations are never brought back.
    pub fn track_conversation(&mut self, id: &str) -> bool {
        if self.conversations.get(id).is_some() {
            return true;
        }
        if self.conversations.phase(id) == Some(ConversationPhase::Removed) {
            return false;
        }
        self.conversations.prepend(Conversation::new(id));
        true
    }

    /// [`ChatSession::track_conversation`] then select it.
    pub async fn open_conversation(&mut self, id: &str) -> bool {
        if !self.track_conversation(id) {
            self.notices.error("That conversation no longer exists.");
            return false;
        }
        self.select_conversation(id).await
    }

    /// Delete a conversation. A 404 counts as deleted. Deleting the
    /// selected conversation starts a fresh one.
    pub async fn delete_conversation(&mut self, id: &str) -> bool {
        if self.conversations.get(id).is_none() {
            self.notices.error("That conversation no longer exists.");
            return false;
        }
        self.conversations.set_phase(id, ConversationPhase::Deleting);

        match self.api.delete_conversation(id).await {
            Ok(outcome) => {
                if outcome == DeleteOutcome::AlreadyGone {
                    debug!(conversation_id = id, "delete: already gone on the backend");
                }
                let was_selected = self.conversations.selected_id() == Some(id);
                self.conversations.remove(id);
                self.notices.success("Conversation deleted.");
                info!(conversation_id = id, "conversation deleted");

                if was_selected {
                    self.cancel_stream();
                    self.transcript.clear();
                    self.create_conversation().await;
                }
                true
            }
            Err(err) => {
                warn!(conversation_id = id, error = %err, "failed to delete conversation");
                self.conversations.set_phase(id, ConversationPhase::Active);
                self.notices
                    .error(format!("Could not delete the conversation: {}", err.user_message()));
                false
            }
        }
    }

    /// Rename a conversation.
    ///
    /// The new title is applied locally whatever the backend says. Returns
    /// false when it could not be persisted; the conversation is then
    /// flagged `title_sync_pending` until [`ChatSession::retry_title_sync`]
    /// succeeds.
    pub async fn rename_conversation(&mut self, id: &str, title: &str) -> bool {
        let title = title.trim();
        if title.is_empty() {
            self.notices.warning("A title cannot be empty.");
            return false;
        }
        if !self.conversations.set_title(id, title) {
            self.notices.error("That conversation no longer exists.");
            return false;
        }
        self.conversations.set_phase(id, ConversationPhase::Renaming);
        let persisted = self.push_title(id, title).await;
        self.conversations.set_phase(id, ConversationPhase::Active);
        persisted
    }

    /// Push every locally-applied title the backend has not accepted yet.
    ///
    /// Returns how many were persisted.
    pub async fn retry_title_sync(&mut self) -> usize {
        let mut synced = 0;
        for (id, title) in self.conversations.pending_title_syncs() {
            if self.push_title(&id, &title).await {
                synced += 1;
            }
        }
        synced
    }

    async fn push_title(&mut self, id: &str, title: &str) -> bool {
        match self.api.update_conversation_title(id, title).await {
            Ok(()) => {
                self.conversations.mark_title_synced(id);
                true
            }
            Err(err) => {
                warn!(conversation_id = id, error = %err, "title not persisted, kept locally");
                self.conversations.mark_title_pending(id);
                false
            }
        }
    }

    /// Ask the backend to purge empty conversations, then reload the list.
    pub async fn cleanup_empty_conversations(&mut self) -> Option<u32> {
        match self.api.cleanup_empty_conversations().await {
            Ok(deleted) => {
                info!(deleted, "empty conversations cleaned up");
                self.notices
                    .success(format!("Removed {} empty conversation(s).", deleted));
                self.load_conversations().await;
                Some(deleted)
            }
            Err(err) => {
                warn!(error = %err, "cleanup failed");
                self.notices
                    .error(format!("Could not clean up conversations: {}", err.user_message()));
                None
            }
        }
    }

    /// Send a message and wait for the reply.
    ///
    /// Creates a conversation first when none is selected. Exactly one
    /// message is appended for the reply: the `final` frame's content, or
    /// the apology when the backend sends an `error` frame or the exchange
    /// fails. Chunk frames never reach the transcript.
    pub async fn send_message(&mut self, content: &str) -> Result<SendOutcome, SendError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(SendError::EmptyMessage);
        }
        if self.in_flight {
            return Err(SendError::Busy);
        }

        let selected = self.conversations.selected_id().map(str::to_string);
        let conversation_id = match selected {
            Some(id) => id,
            None => self
                .create_conversation()
                .await
                .ok_or(SendError::NoConversation)?,
        };

        self.in_flight = true;
        let first_message = self.transcript.is_fresh()
            && self
                .conversations
                .get(&conversation_id)
                .map_or(true, |c| c.message_count == 0);
        self.transcript.append_user_message(content);
        self.transcript.set_loading(true);

        let title = first_message.then(|| generate_conversation_title(content));
        if let Some(title) = &title {
            self.conversations.set_title(&conversation_id, title);
        }

        if let Err(err) = self
            .api
            .save_message(&conversation_id, MessageKind::User, content, None)
            .await
        {
            warn!(conversation_id = %conversation_id, error = %err, "failed to save user message");
        }

        let token = self.cancellation_handle().child_token();
        let reply = self.stream_reply(&conversation_id, content, token).await;

        let (outcome, added) = match reply {
            ReplyResult::Final { content, agent } => {
                self.transcript.append_bot_message(content.clone(), agent.clone());
                self.save_bot_message(&conversation_id, &content, agent.as_deref())
                    .await;
                (SendOutcome::Replied { content }, 2)
            }
            ReplyResult::BackendError(reason) => {
                warn!(conversation_id = %conversation_id, %reason, "backend sent an error frame");
                self.append_apology(&conversation_id).await;
                (SendOutcome::Apologized { reason }, 2)
            }
            ReplyResult::Failed(err) => {
                warn!(conversation_id = %conversation_id, error = %err, "reply failed");
                self.notices.error(err.user_message());
                self.append_apology(&conversation_id).await;
                (
                    SendOutcome::Apologized {
                        reason: err.to_string(),
                    },
                    2,
                )
            }
            ReplyResult::Cancelled => {
                info!(conversation_id = %conversation_id, "reply cancelled");
                (SendOutcome::Cancelled, 1)
            }
        };

        let last_message = self
            .transcript
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();
        if let Some(conversation) = self.conversations.get_mut(&conversation_id) {
            conversation.record_messages(added, &last_message);
        }

        if let Some(title) = title {
            self.push_title(&conversation_id, &title).await;
        }

        self.transcript.set_loading(false);
        self.in_flight = false;
        Ok(outcome)
    }

    async fn stream_reply(
        &self,
        conversation_id: &str,
        content: &str,
        token: CancellationToken,
    ) -> ReplyResult {
        let mut frames = match self.api.send_message(conversation_id, content, token).await {
            Ok(frames) => frames,
            Err(err) => return ReplyResult::Failed(err),
        };

        while let Some(item) = frames.next().await {
            match item {
                Ok(StreamFrame::Chunk { content }) => {
                    debug!(len = content.len(), "chunk received");
                }
                Ok(StreamFrame::Final { content, agent }) => {
                    return ReplyResult::Final { content, agent };
                }
                Ok(StreamFrame::Error { content }) => return ReplyResult::BackendError(content),
                Err(StreamError::Cancelled) => return ReplyResult::Cancelled,
                Err(err) => return ReplyResult::Failed(err.into()),
            }
        }
        ReplyResult::Failed(StreamError::MissingTerminalFrame.into())
    }

    async fn append_apology(&mut self, conversation_id: &str) {
        let content = self.transcript.append_error_message().content.clone();
        self.save_bot_message(conversation_id, &content, Some(ERROR_AGENT))
            .await;
    }

    async fn save_bot_message(&self, conversation_id: &str, content: &str, agent: Option<&str>) {
        if let Err(err) = self
            .api
            .save_message(conversation_id, MessageKind::Bot, content, agent)
            .await
        {
            warn!(conversation_id, error = %err, "failed to save bot message");
        }
    }

    /// Tear the session down: abandon streams, forget credentials and all
    /// loaded state.
    pub fn logout(&mut self) {
        self.cancel_stream();
        self.api.session_mut().logout();
        self.conversations.clear();
        self.transcript.clear();
        self.notices.drain();
    }
}
