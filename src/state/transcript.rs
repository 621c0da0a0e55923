//! Message history of the selected conversation.
//!
//! Messages are append-only and kept in display order. Only the tail of
//! the history is visible; [`Transcript::load_older`] pages further back.

use crate::config::DEFAULT_HISTORY_WINDOW;
use crate::models::Message;

/// Ordered messages plus the loading flag and visible window.
#[derive(Debug, Clone)]
pub struct Transcript {
    messages: Vec<Message>,
    /// A reply is in flight
    loading: bool,
    /// Window size the transcript resets to
    base_window: usize,
    /// Current window size, grown by `load_older`
    window: usize,
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_WINDOW)
    }
}

impl Transcript {
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            messages: Vec::new(),
            loading: false,
            base_window: window,
            window,
        }
    }

    pub fn append_user_message(&mut self, content: impl Into<String>) -> &Message {
        self.push(Message::user(content))
    }

    pub fn append_bot_message(&mut self, content: impl Into<String>, agent: Option<String>) -> &Message {
        self.push(Message::bot(content, agent))
    }

    /// Append the fixed apology reply (agent `error`).
    pub fn append_error_message(&mut self) -> &Message {
        self.push(Message::apology())
    }

    fn push(&mut self, message: Message) -> &Message {
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// The last `window` messages, oldest first.
    pub fn visible_messages(&self) -> &[Message] {
        let start = self.messages.len().saturating_sub(self.window);
        &self.messages[start..]
    }

    /// Messages older than the visible window.
    pub fn hidden_count(&self) -> usize {
        self.messages.len().saturating_sub(self.window)
    }

    /// Widen the window by `step`; returns how many messages came into view.
    pub fn load_older(&mut self, step: usize) -> usize {
        let hidden = self.hidden_count();
        self.window = self.window.saturating_add(step);
        hidden - self.hidden_count()
    }

    /// Replace the history with a local-only greeting.
    pub fn show_welcome(&mut self, user_name: Option<&str>) {
        self.replace(vec![Message::welcome(user_name)]);
    }

    pub fn has_only_welcome(&self) -> bool {
        matches!(self.messages.as_slice(), [only] if only.is_welcome())
    }

    /// No real messages yet: empty or just the greeting.
    pub fn is_fresh(&self) -> bool {
        self.messages.is_empty() || self.has_only_welcome()
    }

    /// Swap in a loaded history and reset the window.
    pub fn replace(&mut self, messages: Vec<Message>) {
        self.messages = messages;
        self.window = self.base_window;
        self.loading = false;
    }

    pub fn clear(&mut self) {
        self.replace(Vec::new());
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Case-insensitive content search over the whole history.
    pub fn search(&self, query: &str) -> Vec<&Message> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.messages
            .iter()
            .filter(|m| m.content.to_lowercase().contains(&needle))
            .collect()
    }
}
