//! Trait abstractions for transport I/O
//!
//! These traits let the connection executor run against mock links in tests.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Failed to connect to {url}: {message}")]
    Connect { url: String, message: String },
    #[error("Failed to send frame: {0}")]
    Send(String),
    #[error("Failed to receive frame: {0}")]
    Receive(String),
}

/// One established duplex text channel
#[async_trait]
pub trait Link: Send {
    /// Write one text frame
    async fn send(&mut self, text: String) -> Result<(), TransportError>;

    /// Next inbound text frame, or `None` once the peer has closed.
    ///
    /// Must be cancel-safe: it is polled inside `select!`.
    async fn recv(&mut self) -> Option<Result<String, TransportError>>;

    /// Close the channel, best effort
    async fn close(&mut self);
}

/// Factory for links
#[async_trait]
pub trait Connector: Send + Sync {
    type Link: Link + 'static;

    async fn connect(&self, url: &str) -> Result<Self::Link, TransportError>;
}

#[async_trait]
impl<T: Connector + ?Sized> Connector for Arc<T> {
    type Link = T::Link;

    async fn connect(&self, url: &str) -> Result<Self::Link, TransportError> {
        (**self).connect(url).await
    }
}
