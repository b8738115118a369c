//! Effects produced by connection state transitions

use std::time::Duration;

/// Effects to be executed after a connection state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEffect {
    /// Open a new link for this attempt (spawns the link task)
    Dial { session_id: String, generation: u64 },

    /// Hand an inbound frame to the caller
    Deliver { text: String },

    /// Tear down the current link task and its outbound queue
    ReleaseLink,

    /// Arm the reconnect timer
    ScheduleReconnect { delay: Duration, generation: u64 },

    /// Disarm the reconnect timer
    CancelReconnect,
}
