//! Remote conversation store
//!
//! The backend keeps the durable copy of each conversation. Only listing and
//! deletion are used from the client side.

mod http;

pub use http::HttpRemoteStore;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// A conversation as the backend returns it.
///
/// Each message is a single-key object mapping a sender tag to the text, for
/// example `{"user": "hi"}`. Messages are kept as raw JSON here and interpreted
/// by the router.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RemoteRecord {
    pub id: String,
    #[serde(default)]
    pub messages: Vec<Value>,
}

#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("Remote store unavailable: {0}")]
    Unavailable(String),
    #[error("Remote store returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Failed to decode remote response: {0}")]
    Decode(String),
}

impl RemoteError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }
}

/// Request/response access to the backend's conversation records
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn list_conversations(&self) -> Result<Vec<RemoteRecord>, RemoteError>;

    async fn delete_conversation(&self, id: &str) -> Result<(), RemoteError>;
}

#[async_trait]
impl<T: RemoteStore + ?Sized> RemoteStore for Arc<T> {
    async fn list_conversations(&self) -> Result<Vec<RemoteRecord>, RemoteError> {
        (**self).list_conversations().await
    }

    async fn delete_conversation(&self, id: &str) -> Result<(), RemoteError> {
        (**self).delete_conversation(id).await
    }
}
