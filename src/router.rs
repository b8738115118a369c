//! Routing between the transport, user actions and the conversation store
//!
//! Inbound frames carry no correlation id. A reply is attached to whichever
//! conversation is active when it arrives, so switching conversations while a
//! reply is outstanding attributes that reply to the newly active one.

use crate::conversation::{Conversation, Message, Sender};
use crate::remote::RemoteRecord;
use crate::store::ConversationStore;
use crate::transport::Outbox;
use serde_json::Value;

/// Where an outbound message ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routed {
    pub conversation_id: String,
    pub message: Message,
    /// The message started a new conversation
    pub created: bool,
    /// The transport accepted the frame
    pub transmitted: bool,
}

/// Where an inbound frame ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivered {
    /// `None` when no conversation was active
    pub conversation_id: Option<String>,
    pub message: Message,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MessageRouter;

impl MessageRouter {
    pub fn new() -> Self {
        Self
    }

    /// Record user text and forward it to the transport.
    ///
    /// With no active conversation, a new one is created from the text and
    /// selected.
    pub fn route_outbound(
        &self,
        store: &mut ConversationStore,
        outbox: &impl Outbox,
        text: &str,
    ) -> Routed {
        let existing = store.active_id().map(str::to_string);

        let (conversation_id, message, created) = match existing {
            Some(id) => {
                let message = Message::user(text);
                // The active id always refers to a stored conversation
                if let Err(e) = store.append_message(&id, message.clone()) {
                    tracing::warn!(error = %e, "Active conversation missing from store");
                }
                (id, message, false)
            }
            None => {
                let conversation = store.create(text);
                let id = conversation.id().to_string();
                let message = conversation.messages()[0].clone();
                if let Err(e) = store.set_active(Some(&id)) {
                    tracing::warn!(error = %e, "Failed to select new conversation");
                }
                tracing::info!(conversation_id = %id, "Started conversation from first message");
                (id, message, true)
            }
        };

        let transmitted = outbox.send(text);
        Routed {
            conversation_id,
            message,
            created,
            transmitted,
        }
    }

    /// Attach an inbound frame to the active conversation
    pub fn route_inbound(&self, store: &mut ConversationStore, text: String) -> Delivered {
        let message = Message::assistant(text);
        let conversation_id = store.active_id().map(str::to_string);

        match &conversation_id {
            Some(id) => {
                if let Err(e) = store.append_message(id, message.clone()) {
                    tracing::warn!(error = %e, "Active conversation missing from store");
                }
            }
            None => {
                tracing::debug!("Reply arrived with no active conversation");
            }
        }

        Delivered {
            conversation_id,
            message,
        }
    }

    /// Turn remote records into conversations.
    ///
    /// Records left without any usable message are dropped.
    pub fn ingest_remote(&self, records: Vec<RemoteRecord>) -> Vec<Conversation> {
        let total = records.len();
        let conversations: Vec<Conversation> = records
            .into_iter()
            .filter_map(|record| {
                let messages = parse_remote_messages(&record.messages);
                Conversation::from_messages(record.id, messages)
            })
            .collect();

        if conversations.len() < total {
            tracing::debug!(
                dropped = total - conversations.len(),
                "Dropped remote conversations without messages"
            );
        }
        conversations
    }
}

/// Interpret `{senderTag: text}` objects.
///
/// Anything that is not a single-key object with a known sender tag and a
/// string value is skipped.
pub fn parse_remote_messages(raw: &[Value]) -> Vec<Message> {
    raw.iter().filter_map(parse_remote_message).collect()
}

fn parse_remote_message(value: &Value) -> Option<Message> {
    let object = value.as_object()?;
    if object.len() != 1 {
        return None;
    }
    let (tag, text) = object.iter().next()?;
    let sender = Sender::from_tag(tag)?;
    Some(Message::new(sender, text.as_str()?))
}
