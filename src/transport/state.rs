//! Connection state types

use serde::Serialize;
use std::time::Duration;

/// Fixed parameters of the transition function
#[derive(Debug, Clone)]
pub struct LinkContext {
    /// Delay between a drop and the next connection attempt
    pub reconnect_delay: Duration,
}

impl LinkContext {
    pub fn new(reconnect_delay: Duration) -> Self {
        Self { reconnect_delay }
    }
}

/// Connection state.
///
/// `generation` counts connection attempts. Events from an older attempt are
/// ignored by the transition function.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LinkState {
    /// Never asked to connect
    #[default]
    Idle,

    /// Attempt in flight
    Connecting { session_id: String, generation: u64 },

    /// Frames flow in both directions
    Open { session_id: String, generation: u64 },

    /// Dropped or failed; a reconnect is scheduled
    Closed { generation: u64 },

    /// Torn down; nothing will reconnect
    Stopped,
}

impl LinkState {
    pub fn generation(&self) -> Option<u64> {
        match self {
            LinkState::Connecting { generation, .. }
            | LinkState::Open { generation, .. }
            | LinkState::Closed { generation } => Some(*generation),
            LinkState::Idle | LinkState::Stopped => None,
        }
    }

    /// Generation the next connection attempt will use
    pub fn next_generation(&self) -> u64 {
        self.generation().map_or(1, |g| g + 1)
    }

    pub fn session_id(&self) -> Option<&str> {
        match self {
            LinkState::Connecting { session_id, .. } | LinkState::Open { session_id, .. } => {
                Some(session_id)
            }
            _ => None,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, LinkState::Open { .. })
    }

    pub fn status(&self) -> ConnectionStatus {
        match self {
            LinkState::Idle => ConnectionStatus::Idle,
            LinkState::Connecting { .. } => ConnectionStatus::Connecting,
            LinkState::Open { .. } => ConnectionStatus::Open,
            LinkState::Closed { .. } => ConnectionStatus::Closed,
            LinkState::Stopped => ConnectionStatus::Stopped,
        }
    }
}

/// Coarse connection status for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    Idle,
    Connecting,
    Open,
    Closed,
    Stopped,
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ConnectionStatus::Idle => "idle",
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Open => "open",
            ConnectionStatus::Closed => "closed",
            ConnectionStatus::Stopped => "stopped",
        };
        f.write_str(name)
    }
}
