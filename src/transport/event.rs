//! Events that drive the connection state machine

/// Events that trigger connection state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    // Caller events
    Connect {
        session_id: String,
    },
    Shutdown,

    // Link task events
    Opened {
        generation: u64,
    },
    ConnectFailed {
        generation: u64,
        error: String,
    },
    Frame {
        generation: u64,
        text: String,
    },
    Dropped {
        generation: u64,
        reason: Option<String>,
    },

    // Timer events
    ReconnectDue {
        generation: u64,
        session_id: String,
    },
}
