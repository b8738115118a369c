//! In-memory registry of conversations
//!
//! The store exclusively owns every `Conversation`. Everything else refers to
//! conversations by id.

#[cfg(test)]
mod proptests;

use crate::conversation::{Conversation, Message};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Conversation not found: {0}")]
    ConversationNotFound(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Outcome of removing a conversation
#[derive(Debug)]
pub struct Removed {
    pub conversation: Conversation,
    /// The removed conversation was the active one
    pub was_active: bool,
}

/// Conversations in insertion order plus the active selection
#[derive(Debug, Default)]
pub struct ConversationStore {
    conversations: Vec<Conversation>,
    active: Option<String>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a conversation seeded with a user message
    pub fn create(&mut self, seed_text: &str) -> &Conversation {
        let id = uuid::Uuid::new_v4().to_string();
        let conversation = Conversation::new(id, Message::user(seed_text));
        tracing::debug!(conversation_id = %conversation.id(), "Created conversation");
        self.conversations.push(conversation);
        &self.conversations[self.conversations.len() - 1]
    }

    pub fn list(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn get(&self, id: &str) -> StoreResult<&Conversation> {
        self.conversations
            .iter()
            .find(|c| c.id() == id)
            .ok_or_else(|| StoreError::ConversationNotFound(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.conversations.iter().any(|c| c.id() == id)
    }

    pub fn append_message(&mut self, id: &str, message: Message) -> StoreResult<()> {
        let conversation = self
            .conversations
            .iter_mut()
            .find(|c| c.id() == id)
            .ok_or_else(|| StoreError::ConversationNotFound(id.to_string()))?;
        conversation.push(message);
        Ok(())
    }

    /// Select a conversation, or clear the selection with `None`.
    ///
    /// Unknown ids are rejected and the selection is left unchanged.
    pub fn set_active(&mut self, id: Option<&str>) -> StoreResult<()> {
        match id {
            Some(id) if !self.contains(id) => Err(StoreError::ConversationNotFound(id.to_string())),
            Some(id) => {
                self.active = Some(id.to_string());
                Ok(())
            }
            None => {
                self.active = None;
                Ok(())
            }
        }
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn active(&self) -> Option<&Conversation> {
        self.active.as_deref().and_then(|id| self.get(id).ok())
    }

    pub fn remove(&mut self, id: &str) -> StoreResult<Removed> {
        let index = self
            .conversations
            .iter()
            .position(|c| c.id() == id)
            .ok_or_else(|| StoreError::ConversationNotFound(id.to_string()))?;
        let conversation = self.conversations.remove(index);

        let was_active = self.active.as_deref() == Some(id);
        if was_active {
            self.active = None;
        }

        Ok(Removed {
            conversation,
            was_active,
        })
    }

    /// Install conversations listed by the backend.
    ///
    /// A listed conversation replaces the local one with the same id. Local
    /// conversations the listing does not mention are kept after the listed
    /// ones, so nothing disappears without an explicit `remove`. The active
    /// selection is untouched.
    pub fn merge_listed(&mut self, listed: Vec<Conversation>) {
        let local = std::mem::take(&mut self.conversations);
        let kept: Vec<Conversation> = local
            .into_iter()
            .filter(|c| !listed.iter().any(|l| l.id() == c.id()))
            .collect();
        tracing::debug!(listed = listed.len(), local_only = kept.len(), "Merged listed conversations");

        self.conversations = listed;
        self.conversations.extend(kept);
    }
}
