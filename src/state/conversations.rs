//! The user's conversation list and selection.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::models::{Conversation, ServerConversation};

/// Client-observed lifecycle of a listed conversation.
///
/// `Active -> (Renaming | Deleting) -> Active | Removed`. A conversation
/// being created has no id yet and is not listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationPhase {
    Active,
    Renaming,
    Deleting,
    Removed,
}

/// Conversations in display order (newest first) plus the selection.
#[derive(Debug, Clone, Default)]
pub struct ConversationList {
    items: Vec<Conversation>,
    selected: Option<String>,
    phases: HashMap<String, ConversationPhase>,
    removed: HashSet<String>,
    /// Conversations whose local title still has to reach the backend
    title_sync_queue: VecDeque<String>,
}

impl ConversationList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the list with what the backend returned, dropping empty and
    /// removed conversations. Returns the id that should be selected: the
    /// first conversation with messages, else the first one.
    ///
    /// Local state survives the merge: a title still waiting to be synced
    /// stays displayed and queued, and message counts never go down.
    pub fn replace_from_server(&mut self, server: Vec<ServerConversation>) -> Option<String> {
        let previous: HashMap<String, Conversation> = std::mem::take(&mut self.items)
            .into_iter()
            .map(|c| (c.id.clone(), c))
            .collect();

        let removed = &self.removed;
        self.items = server
            .into_iter()
            .map(Conversation::from)
            .filter(|c| !removed.contains(&c.id))
            .map(|mut c| {
                if let Some(local) = previous.get(&c.id) {
                    c.message_count = c.message_count.max(local.message_count);
                    if local.title_sync_pending {
                        c.title = local.title.clone();
                        c.title_sync_pending = true;
                    }
                }
                c
            })
            .filter(|c| !c.is_empty())
            .collect();

        let mut phases: HashMap<String, ConversationPhase> = self
            .removed
            .iter()
            .map(|id| (id.clone(), ConversationPhase::Removed))
            .collect();
        phases.extend(
            self.items
                .iter()
                .map(|c| (c.id.clone(), ConversationPhase::Active)),
        );
        self.phases = phases;

        let items = &self.items;
        self.title_sync_queue
            .retain(|queued| items.iter().any(|c| &c.id == queued));
        if let Some(id) = &self.selected {
            if self.get(id).is_none() {
                self.selected = None;
            }
        }

        self.items
            .iter()
            .find(|c| c.message_count > 0)
            .or_else(|| self.items.first())
            .map(|c| c.id.clone())
    }

    /// Insert at the top of the list.
    pub fn prepend(&mut self, conversation: Conversation) {
        self.removed.remove(&conversation.id);
        self.phases
            .insert(conversation.id.clone(), ConversationPhase::Active);
        self.items.insert(0, conversation);
    }

    /// Remove a conversation. A removed conversation stops being selected
    /// and can never be selected again.
    pub fn remove(&mut self, id: &str) -> Option<Conversation> {
        let index = self.items.iter().position(|c| c.id == id)?;
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }
        self.title_sync_queue.retain(|queued| queued != id);
        self.phases.insert(id.to_string(), ConversationPhase::Removed);
        self.removed.insert(id.to_string());
        Some(self.items.remove(index))
    }

    /// Select `id`; false if it is not in the list.
    pub fn select(&mut self, id: &str) -> bool {
        if self.removed.contains(id) || self.get(id).is_none() {
            return false;
        }
        self.selected = Some(id.to_string());
        true
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected(&self) -> Option<&Conversation> {
        self.selected.as_deref().and_then(|id| self.get(id))
    }

    pub fn get(&self, id: &str) -> Option<&Conversation> {
        self.items.iter().find(|c| c.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Conversation> {
        self.items.iter_mut().find(|c| c.id == id)
    }

    pub fn phase(&self, id: &str) -> Option<ConversationPhase> {
        self.phases.get(id).copied()
    }

    pub fn set_phase(&mut self, id: &str, phase: ConversationPhase) {
        if self.removed.contains(id) {
            return;
        }
        self.phases.insert(id.to_string(), phase);
    }

    /// Apply a title locally. Returns false for unknown ids.
    pub fn set_title(&mut self, id: &str, title: &str) -> bool {
        match self.get_mut(id) {
            Some(conversation) => {
                conversation.title = title.to_string();
                true
            }
            None => false,
        }
    }

    /// Flag the local title as not yet persisted and queue a retry.
    pub fn mark_title_pending(&mut self, id: &str) {
        if let Some(conversation) = self.get_mut(id) {
            conversation.title_sync_pending = true;
            if !self.title_sync_queue.iter().any(|queued| queued == id) {
                self.title_sync_queue.push_back(id.to_string());
            }
        }
    }

    pub fn mark_title_synced(&mut self, id: &str) {
        if let Some(conversation) = self.get_mut(id) {
            conversation.title_sync_pending = false;
        }
        self.title_sync_queue.retain(|queued| queued != id);
    }

    /// `(id, title)` of every conversation waiting for a title sync.
    pub fn pending_title_syncs(&self) -> Vec<(String, String)> {
        self.title_sync_queue
            .iter()
            .filter_map(|id| self.get(id).map(|c| (c.id.clone(), c.title.clone())))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Conversation> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
