//! Session controller
//!
//! The façade the presentation layer talks to. It owns the store, the
//! transport and the remote store handle, and applies every event on one
//! logical loop: the caller awaits `next_event` and passes the result to
//! `handle_event`, interleaved with user actions.

use crate::config::ChatConfig;
use crate::conversation::{Conversation, Message};
use crate::remote::{HttpRemoteStore, RemoteError, RemoteRecord, RemoteStore};
use crate::router::MessageRouter;
use crate::store::{ConversationStore, StoreError};
use crate::transport::{
    ConnectionStatus, Connector, LinkEvent, TransportConnection, TransportUpdate,
    WebSocketConnector,
};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Conversation not found: {0}")]
    NotFound(String),
}

impl From<StoreError> for SessionError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::ConversationNotFound(id) => SessionError::NotFound(id),
        }
    }
}

/// Something that happened outside the controller and must be applied on its loop
#[derive(Debug)]
pub enum SessionEvent {
    Transport(LinkEvent),
    ConversationsListed(Result<Vec<RemoteRecord>, RemoteError>),
    ConversationDeleted {
        id: String,
        result: Result<(), RemoteError>,
    },
}

/// What the presentation layer should reflect after an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionUpdate {
    Reply {
        conversation_id: Option<String>,
        message: Message,
    },
    ConnectionChanged(ConnectionStatus),
    ConversationsLoaded {
        count: usize,
    },
    ConversationDeleted {
        id: String,
        remote_ok: bool,
    },
}

/// Result of `send_message`.
///
/// The caller clears its input in every case; nothing is queued for later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Sent {
        conversation_id: String,
        created: bool,
    },
    /// Blank after trimming
    Empty,
    /// Transport not open; the text was discarded
    NotConnected,
    /// Recorded locally, but the link went away before the frame could be
    /// queued. No reply is expected.
    Unsent { conversation_id: String },
}

/// A session over HTTP and websockets
pub type ProductionSession = SessionController<HttpRemoteStore, WebSocketConnector>;

pub struct SessionController<R, C>
where
    R: RemoteStore + 'static,
    C: Connector + 'static,
{
    ws_url: String,
    store: ConversationStore,
    router: MessageRouter,
    transport: TransportConnection<C>,
    remote: Arc<R>,
    /// Messages currently shown to the user
    visible: Vec<Message>,
    /// A send is waiting for the next inbound frame
    pending: bool,
    remote_tx: mpsc::UnboundedSender<SessionEvent>,
    remote_rx: mpsc::UnboundedReceiver<SessionEvent>,
}

impl<R, C> SessionController<R, C>
where
    R: RemoteStore + 'static,
    C: Connector + 'static,
{
    pub fn new(config: &ChatConfig, remote: R, connector: C) -> Self {
        let (remote_tx, remote_rx) = mpsc::unbounded_channel();
        Self {
            ws_url: config.ws_url.clone(),
            store: ConversationStore::new(),
            router: MessageRouter::new(),
            transport: TransportConnection::new(connector, config.reconnect_delay),
            remote: Arc::new(remote),
            visible: Vec::new(),
            pending: false,
            remote_tx,
            remote_rx,
        }
    }

    // ==================== Queries ====================

    pub fn conversations(&self) -> &[Conversation] {
        self.store.list()
    }

    pub fn active_conversation_id(&self) -> Option<&str> {
        self.store.active_id()
    }

    pub fn active_conversation(&self) -> Option<&Conversation> {
        self.store.active()
    }

    pub fn visible_messages(&self) -> &[Message] {
        &self.visible
    }

    /// Presentation hint only: true between a send and the next inbound
    /// frame, whichever conversation that frame lands on
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn connection_status(&self) -> ConnectionStatus {
        self.transport.status()
    }

    // ==================== Lifecycle ====================

    /// Connect the transport and load the conversation list
    pub fn open(&mut self) -> Option<SessionUpdate> {
        let update = self.transport.connect(&self.ws_url);
        self.refresh_conversations();
        update.and_then(|u| self.apply_transport_update(u))
    }

    /// Close the transport for good
    pub fn shutdown(&mut self) -> Option<SessionUpdate> {
        tracing::info!("Shutting down session");
        self.transport
            .close()
            .and_then(|u| self.apply_transport_update(u))
    }

    // ==================== User Actions ====================

    pub fn send_message(&mut self, text: &str) -> SendOutcome {
        let text = text.trim();
        if text.is_empty() {
            return SendOutcome::Empty;
        }
        if !self.transport.is_open() {
            tracing::debug!(status = %self.transport.status(), "Discarding message, transport not open");
            return SendOutcome::NotConnected;
        }

        let routed = self
            .router
            .route_outbound(&mut self.store, &self.transport, text);
        if routed.created {
            self.visible = vec![routed.message];
        } else {
            self.visible.push(routed.message);
        }

        if !routed.transmitted {
            tracing::warn!(conversation_id = %routed.conversation_id, "Frame dropped by transport");
            return SendOutcome::Unsent {
                conversation_id: routed.conversation_id,
            };
        }
        self.pending = true;

        SendOutcome::Sent {
            conversation_id: routed.conversation_id,
            created: routed.created,
        }
    }

    /// Start a conversation without sending anything
    pub fn new_conversation(&mut self, seed_text: &str) -> String {
        let conversation = self.store.create(seed_text);
        let id = conversation.id().to_string();
        self.visible = conversation.messages().to_vec();
        if let Err(e) = self.store.set_active(Some(&id)) {
            tracing::warn!(error = %e, "Failed to select new conversation");
        }
        tracing::info!(conversation_id = %id, "Started new conversation");
        id
    }

    pub fn resume(&mut self, id: &str) -> Result<(), SessionError> {
        let messages = match self.store.get(id) {
            Ok(conversation) => conversation.messages().to_vec(),
            Err(e) => {
                tracing::info!(conversation_id = %id, "Cannot resume unknown conversation");
                return Err(e.into());
            }
        };
        self.store.set_active(Some(id))?;
        self.visible = messages;
        tracing::info!(conversation_id = %id, "Resumed conversation");
        Ok(())
    }

    /// Delete locally right away; the remote delete runs in the background
    /// and its failure is only logged.
    pub fn delete_conversation(&mut self, id: &str) -> Result<(), SessionError> {
        let removed = match self.store.remove(id) {
            Ok(removed) => removed,
            Err(e) => {
                tracing::info!(conversation_id = %id, "Cannot delete unknown conversation");
                return Err(e.into());
            }
        };
        if removed.was_active {
            self.visible.clear();
        }
        tracing::info!(
            conversation_id = %id,
            title = %removed.conversation.title(),
            was_active = removed.was_active,
            "Deleted conversation"
        );

        let remote = Arc::clone(&self.remote);
        let events = self.remote_tx.clone();
        let id = id.to_string();
        tokio::spawn(async move {
            let result = remote.delete_conversation(&id).await;
            let _ = events.send(SessionEvent::ConversationDeleted { id, result });
        });
        Ok(())
    }

    /// Reload the conversation list in the background
    pub fn refresh_conversations(&self) {
        let remote = Arc::clone(&self.remote);
        let events = self.remote_tx.clone();
        tokio::spawn(async move {
            let result = remote.list_conversations().await;
            let _ = events.send(SessionEvent::ConversationsListed(result));
        });
    }

    // ==================== Event Loop ====================

    /// Wait for the next transport or remote completion
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        tokio::select! {
            Some(event) = self.transport.next_event() => Some(SessionEvent::Transport(event)),
            Some(event) = self.remote_rx.recv() => Some(event),
            else => None,
        }
    }

    pub fn handle_event(&mut self, event: SessionEvent) -> Option<SessionUpdate> {
        match event {
            SessionEvent::Transport(event) => self
                .transport
                .handle(event)
                .and_then(|u| self.apply_transport_update(u)),

            SessionEvent::ConversationsListed(result) => {
                let conversations = match result {
                    Ok(records) => self.router.ingest_remote(records),
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to list conversations, keeping local ones");
                        Vec::new()
                    }
                };
                let count = conversations.len();
                self.store.merge_listed(conversations);
                tracing::info!(count, total = self.store.list().len(), "Loaded conversations");
                Some(SessionUpdate::ConversationsLoaded { count })
            }

            SessionEvent::ConversationDeleted { id, result } => {
                let remote_ok = match result {
                    Ok(()) => true,
                    Err(e) => {
                        tracing::warn!(
                            conversation_id = %id,
                            error = %e,
                            "Remote delete failed, local deletion stands"
                        );
                        false
                    }
                };
                Some(SessionUpdate::ConversationDeleted { id, remote_ok })
            }
        }
    }

    fn apply_transport_update(&mut self, update: TransportUpdate) -> Option<SessionUpdate> {
        match update {
            TransportUpdate::Frame(text) => {
                self.pending = false;
                let delivered = self.router.route_inbound(&mut self.store, text);
                self.visible.push(delivered.message.clone());
                Some(SessionUpdate::Reply {
                    conversation_id: delivered.conversation_id,
                    message: delivered.message,
                })
            }
            TransportUpdate::Status(status) => Some(SessionUpdate::ConnectionChanged(status)),
        }
    }
}
