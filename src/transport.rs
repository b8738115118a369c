//! Duplex text transport to the chat backend
//!
//! The connection is a pure state machine (`transition`) driven by an
//! executor (`TransportConnection`) that owns the I/O tasks. A dropped
//! connection is an expected state: it is always followed by a reconnect
//! attempt after a fixed delay, with no retry limit.

mod connection;
mod effect;
mod event;
mod state;
mod traits;
pub(crate) mod transition;
mod websocket;


pub use connection::{Outbox, TransportConnection, TransportUpdate};
pub use effect::LinkEffect;
pub use event::LinkEvent;
pub use state::{ConnectionStatus, LinkContext, LinkState};
pub use traits::Connector;
#[cfg(test)]
pub use traits::{Link, TransportError};
pub use transition::transition;
pub use websocket::WebSocketConnector;

/// Fresh identifier for one connection attempt.
///
/// Unrelated to any conversation id.
pub fn new_session_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
