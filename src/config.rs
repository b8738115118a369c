//! Client configuration

use std::time::Duration;

const DEFAULT_SERVER_URL: &str = "http://localhost:8000";
const DEFAULT_WS_URL: &str = "ws://localhost:8000/ws";
const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(3);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the chat client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    /// Base URL of the backend's REST endpoints
    pub server_url: String,
    /// Base URL for transport connections; the session id is appended
    pub ws_url: String,
    /// Fixed delay before every reconnect attempt
    pub reconnect_delay: Duration,
    /// Timeout for remote store requests
    pub request_timeout: Duration,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            ws_url: DEFAULT_WS_URL.to_string(),
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl ChatConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            server_url: lookup("CHATLINE_SERVER_URL").unwrap_or(defaults.server_url),
            ws_url: lookup("CHATLINE_WS_URL").unwrap_or(defaults.ws_url),
            reconnect_delay: lookup("CHATLINE_RECONNECT_DELAY_MS")
                .and_then(|v| v.parse().ok())
                .map_or(defaults.reconnect_delay, Duration::from_millis),
            request_timeout: lookup("CHATLINE_REQUEST_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .map_or(defaults.request_timeout, Duration::from_secs),
        }
    }
}
