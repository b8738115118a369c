//! HTTP implementation of the remote store

use super::{RemoteError, RemoteRecord, RemoteStore};
use async_trait::async_trait;
use reqwest::{Client, Response};
use std::time::Duration;

/// Remote store reached over the backend's REST endpoints
pub struct HttpRemoteStore {
    client: Client,
    base_url: String,
}

impl HttpRemoteStore {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::unavailable(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn conversations_url(&self) -> String {
        format!("{}/conversations", self.base_url)
    }

    async fn check_status(response: Response) -> Result<Response, RemoteError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(RemoteError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn list_conversations(&self) -> Result<Vec<RemoteRecord>, RemoteError> {
        let response = self
            .client
            .get(self.conversations_url())
            .send()
            .await
            .map_err(|e| RemoteError::unavailable(e.to_string()))?;
        let response = Self::check_status(response).await?;

        response
            .json::<Vec<RemoteRecord>>()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))
    }

    async fn delete_conversation(&self, id: &str) -> Result<(), RemoteError> {
        let url = format!("{}/{id}", self.conversations_url());
        let response = self
            .client
            .delete(url)
            .send()
            .await
            .map_err(|e| RemoteError::unavailable(e.to_string()))?;
        Self::check_status(response).await?;
        Ok(())
    }
}
