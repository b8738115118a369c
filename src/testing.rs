//! Mock implementations for testing
//!
//! These mocks let the transport executor and the session controller run
//! without sockets or HTTP.

use crate::remote::{RemoteError, RemoteRecord, RemoteStore};
use crate::transport::{Connector, Link, TransportError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, Notify};
use tokio_util::sync::CancellationToken;

// ============================================================================
// Mock Connector
// ============================================================================

#[derive(Default)]
struct ConnectorState {
    dialed: Vec<String>,
    refuse: usize,
    links: Vec<MockLinkHandle>,
}

/// Connector that hands out in-memory links.
///
/// Clones share state, so a test keeps one clone and gives the other to the
/// code under test.
#[derive(Clone, Default)]
pub struct MockConnector {
    state: Arc<Mutex<ConnectorState>>,
    link_created: Arc<Notify>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `count` connection attempts
    pub fn refuse_next(&self, count: usize) {
        self.state.lock().unwrap().refuse = count;
    }

    /// Every URL a connection was attempted on, in order
    pub fn dialed_urls(&self) -> Vec<String> {
        self.state.lock().unwrap().dialed.clone()
    }

    /// Handle to the `index`th successfully opened link, waiting for it if
    /// it has not been opened yet
    pub async fn link(&self, index: usize) -> MockLinkHandle {
        loop {
            let created = self.link_created.notified();
            if let Some(handle) = self.state.lock().unwrap().links.get(index).cloned() {
                return handle;
            }
            created.await;
        }
    }
}

#[async_trait]
impl Connector for MockConnector {
    type Link = MockLink;

    async fn connect(&self, url: &str) -> Result<Self::Link, TransportError> {
        let mut state = self.state.lock().unwrap();
        state.dialed.push(url.to_string());
        if state.refuse > 0 {
            state.refuse -= 1;
            return Err(TransportError::Connect {
                url: url.to_string(),
                message: "connection refused".to_string(),
            });
        }

        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let (sent_tx, sent_rx) = mpsc::unbounded_channel();
        let closed = CancellationToken::new();

        state.links.push(MockLinkHandle {
            inbound: inbound_tx,
            sent: Arc::new(tokio::sync::Mutex::new(sent_rx)),
            closed: closed.clone(),
        });
        drop(state);
        self.link_created.notify_waiters();

        Ok(MockLink {
            inbound: inbound_rx,
            sent: sent_tx,
            closed,
        })
    }
}

// ============================================================================
// Mock Link
// ============================================================================

enum Inbound {
    Frame(String),
    HangUp,
}

/// The code-under-test side of an in-memory link
pub struct MockLink {
    inbound: mpsc::UnboundedReceiver<Inbound>,
    sent: mpsc::UnboundedSender<String>,
    closed: CancellationToken,
}

#[async_trait]
impl Link for MockLink {
    async fn send(&mut self, text: String) -> Result<(), TransportError> {
        self.sent
            .send(text)
            .map_err(|_| TransportError::Send("peer gone".to_string()))
    }

    async fn recv(&mut self) -> Option<Result<String, TransportError>> {
        match self.inbound.recv().await {
            Some(Inbound::Frame(text)) => Some(Ok(text)),
            Some(Inbound::HangUp) | None => None,
        }
    }

    async fn close(&mut self) {
        self.closed.cancel();
    }
}

/// The test side of an in-memory link
#[derive(Clone)]
pub struct MockLinkHandle {
    inbound: mpsc::UnboundedSender<Inbound>,
    sent: Arc<tokio::sync::Mutex<mpsc::UnboundedReceiver<String>>>,
    closed: CancellationToken,
}

impl MockLinkHandle {
    /// Deliver a frame from the server
    pub fn push_frame(&self, text: &str) {
        let _ = self.inbound.send(Inbound::Frame(text.to_string()));
    }

    /// Close the connection from the server side
    pub fn hang_up(&self) {
        let _ = self.inbound.send(Inbound::HangUp);
    }

    /// Next frame the client wrote
    pub async fn next_sent(&self) -> Option<String> {
        self.sent.lock().await.recv().await
    }

    /// Wait until the client closed this link
    pub async fn wait_closed(&self) {
        self.closed.cancelled().await;
    }
}

// ============================================================================
// Mock Remote Store
// ============================================================================

/// Remote store with queued list results and recorded deletes
#[derive(Default)]
pub struct MockRemoteStore {
    lists: Mutex<VecDeque<Result<Vec<RemoteRecord>, RemoteError>>>,
    fail_deletes: Mutex<bool>,
    /// Ids passed to `delete_conversation`, in call order
    pub deleted: Mutex<Vec<String>>,
}

impl MockRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the result of the next list call.
    ///
    /// With nothing queued, listing returns an empty set.
    pub fn queue_list(&self, result: Result<Vec<RemoteRecord>, RemoteError>) {
        self.lists.lock().unwrap().push_back(result);
    }

    pub fn fail_deletes(&self) {
        *self.fail_deletes.lock().unwrap() = true;
    }

    pub fn deleted_ids(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteStore for MockRemoteStore {
    async fn list_conversations(&self) -> Result<Vec<RemoteRecord>, RemoteError> {
        self.lists
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn delete_conversation(&self, id: &str) -> Result<(), RemoteError> {
        self.deleted.lock().unwrap().push(id.to_string());
        if *self.fail_deletes.lock().unwrap() {
            return Err(RemoteError::unavailable("backend down"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_connector_refuses_then_links() {
        let connector = MockConnector::new();
        connector.refuse_next(1);

        assert!(connector.connect("ws://a/1").await.is_err());
        let mut link = connector.connect("ws://a/2").await.unwrap();
        assert_eq!(connector.dialed_urls(), vec!["ws://a/1", "ws://a/2"]);

        let handle = connector.link(0).await;
        handle.push_frame("hi");
        assert_eq!(link.recv().await, Some(Ok("hi".to_string())));

        link.send("yo".to_string()).await.unwrap();
        assert_eq!(handle.next_sent().await.as_deref(), Some("yo"));

        handle.hang_up();
        assert_eq!(link.recv().await, None);
    }

    #[tokio::test]
    async fn test_mock_remote_store() {
        let remote = MockRemoteStore::new();
        remote.queue_list(Err(RemoteError::unavailable("down")));

        assert!(remote.list_conversations().await.is_err());
        assert!(remote.list_conversations().await.unwrap().is_empty());

        remote.delete_conversation("a").await.unwrap();
        remote.fail_deletes();
        assert!(remote.delete_conversation("b").await.is_err());
        assert_eq!(remote.deleted_ids(), vec!["a", "b"]);
    }
}
