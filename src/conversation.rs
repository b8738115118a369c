//! Conversation data model
//!
//! Messages are immutable once created. A conversation always holds at least
//! one message and its title is fixed when it is built.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Title used when the first message of a conversation has no text
pub const UNTITLED: &str = "Untitled";

/// Who produced a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sender {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "ai")]
    Assistant,
}

impl Sender {
    /// Parse a remote sender tag. Unknown tags yield `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "user" => Some(Sender::User),
            "ai" => Some(Sender::Assistant),
            _ => None,
        }
    }
}

/// One utterance in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            sender,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Sender::Assistant, text)
    }
}

/// Title for a conversation whose first message has the given text
pub fn derive_title(first_text: &str) -> String {
    if first_text.is_empty() {
        UNTITLED.to_string()
    } else {
        first_text.to_string()
    }
}

/// An append-only sequence of messages with a fixed title
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conversation {
    id: String,
    messages: Vec<Message>,
    title: String,
}

impl Conversation {
    /// Start a conversation from its first message
    pub fn new(id: impl Into<String>, first: Message) -> Self {
        let title = derive_title(&first.text);
        Self {
            id: id.into(),
            messages: vec![first],
            title,
        }
    }

    /// Build a conversation from an existing history.
    ///
    /// Returns `None` for an empty history.
    pub fn from_messages(id: impl Into<String>, messages: Vec<Message>) -> Option<Self> {
        let title = derive_title(&messages.first()?.text);
        Some(Self {
            id: id.into(),
            messages,
            title,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub(crate) fn push(&mut self, message: Message) {
        self.messages.push(message);
    }
}
