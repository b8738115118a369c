//! Connection executor
//!
//! Runs the pure transition function and carries out its effects. Link and
//! timer tasks report back through an event channel that the owner drains on
//! its own loop, so state only ever changes on that loop.

use super::traits::{Connector, Link};
use super::{new_session_id, transition, ConnectionStatus, LinkContext, LinkEffect, LinkEvent, LinkState};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Something that accepts outbound text frames
pub trait Outbox {
    /// Queue a frame. Returns false when the frame was dropped.
    fn send(&self, text: &str) -> bool;
}

/// What a handled event means for the owner of the connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportUpdate {
    /// An inbound frame, verbatim
    Frame(String),
    /// The connection moved to a different status
    Status(ConnectionStatus),
}

pub struct TransportConnection<C>
where
    C: Connector + 'static,
{
    context: LinkContext,
    state: LinkState,
    connector: Arc<C>,
    endpoint: String,
    event_tx: mpsc::UnboundedSender<LinkEvent>,
    event_rx: mpsc::UnboundedReceiver<LinkEvent>,
    /// Queue feeding the live link task
    outbound: Option<mpsc::UnboundedSender<String>>,
    /// Token to stop the live link task
    link_cancel: Option<CancellationToken>,
    /// Token to disarm the pending reconnect timer
    reconnect_cancel: Option<CancellationToken>,
    /// Parent of every task token; cancelled on teardown
    shutdown: CancellationToken,
}

impl<C> TransportConnection<C>
where
    C: Connector + 'static,
{
    pub fn new(connector: C, reconnect_delay: Duration) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        Self {
            context: LinkContext::new(reconnect_delay),
            state: LinkState::Idle,
            connector: Arc::new(connector),
            endpoint: String::new(),
            event_tx,
            event_rx,
            outbound: None,
            link_cancel: None,
            reconnect_cancel: None,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        self.state.status()
    }

    pub fn is_open(&self) -> bool {
        self.state.is_open()
    }

    /// Start connecting to `endpoint`.
    ///
    /// Every attempt, including reconnects, is addressed as
    /// `{endpoint}/{session_id}` with a freshly generated session id.
    pub fn connect(&mut self, endpoint: &str) -> Option<TransportUpdate> {
        self.endpoint = endpoint.trim_end_matches('/').to_string();
        self.handle(LinkEvent::Connect {
            session_id: new_session_id(),
        })
    }

    /// Tear down. Cancels the link and any pending reconnect; nothing
    /// reconnects afterwards.
    pub fn close(&mut self) -> Option<TransportUpdate> {
        let update = self.handle(LinkEvent::Shutdown);
        self.shutdown.cancel();
        update
    }

    /// Wait for the next event from a link or timer task
    pub async fn next_event(&mut self) -> Option<LinkEvent> {
        self.event_rx.recv().await
    }

    /// Apply one event and execute the resulting effects
    pub fn handle(&mut self, event: LinkEvent) -> Option<TransportUpdate> {
        let result = transition(&self.state, &self.context, event);
        if result.is_noop(&self.state) {
            tracing::trace!(state = ?self.state, "Ignoring transport event");
            return None;
        }

        let old_status = self.state.status();
        self.state = result.new_state;

        let mut update = None;
        for effect in result.effects {
            if let Some(delivered) = self.execute_effect(effect) {
                update = Some(delivered);
            }
        }

        let new_status = self.state.status();
        if new_status != old_status {
            tracing::info!(
                from = %old_status,
                to = %new_status,
                generation = ?self.state.generation(),
                session_id = ?self.state.session_id(),
                "Transport status changed"
            );
            update = Some(TransportUpdate::Status(new_status));
        }
        update
    }

    fn execute_effect(&mut self, effect: LinkEffect) -> Option<TransportUpdate> {
        match effect {
            LinkEffect::Dial {
                session_id,
                generation,
            } => {
                let url = format!("{}/{session_id}", self.endpoint);
                let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
                let cancel = self.shutdown.child_token();

                if let Some(previous) = self.link_cancel.replace(cancel.clone()) {
                    previous.cancel();
                }
                self.outbound = Some(outbound_tx);

                tracing::info!(url = %url, generation, "Connecting");
                tokio::spawn(run_link(
                    Arc::clone(&self.connector),
                    url,
                    generation,
                    outbound_rx,
                    self.event_tx.clone(),
                    cancel,
                ));
                None
            }

            LinkEffect::Deliver { text } => {
                tracing::debug!(len = text.len(), "Received frame");
                Some(TransportUpdate::Frame(text))
            }

            LinkEffect::ReleaseLink => {
                self.outbound = None;
                if let Some(cancel) = self.link_cancel.take() {
                    cancel.cancel();
                }
                None
            }

            LinkEffect::ScheduleReconnect { delay, generation } => {
                let cancel = self.shutdown.child_token();
                if let Some(previous) = self.reconnect_cancel.replace(cancel.clone()) {
                    previous.cancel();
                }

                tracing::info!(delay_ms = %delay.as_millis(), generation, "Scheduling reconnect");
                let event_tx = self.event_tx.clone();
                tokio::spawn(async move {
                    tokio::select! {
                        () = cancel.cancelled() => {}
                        () = tokio::time::sleep(delay) => {
                            let _ = event_tx.send(LinkEvent::ReconnectDue {
                                generation,
                                session_id: new_session_id(),
                            });
                        }
                    }
                });
                None
            }

            LinkEffect::CancelReconnect => {
                if let Some(cancel) = self.reconnect_cancel.take() {
                    cancel.cancel();
                }
                None
            }
        }
    }
}

impl<C> Outbox for TransportConnection<C>
where
    C: Connector + 'static,
{
    fn send(&self, text: &str) -> bool {
        match (&self.state, &self.outbound) {
            (LinkState::Open { .. }, Some(outbound)) => outbound.send(text.to_string()).is_ok(),
            _ => {
                tracing::debug!(status = %self.state.status(), "Dropping frame, transport not open");
                false
            }
        }
    }
}

impl<C> Drop for TransportConnection<C>
where
    C: Connector + 'static,
{
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Owns one link for its whole life: connect, then pump frames both ways
/// until the peer closes, a write fails, or the token is cancelled.
async fn run_link<C: Connector>(
    connector: Arc<C>,
    url: String,
    generation: u64,
    mut outbound_rx: mpsc::UnboundedReceiver<String>,
    event_tx: mpsc::UnboundedSender<LinkEvent>,
    cancel: CancellationToken,
) {
    let connected = tokio::select! {
        () = cancel.cancelled() => return,
        result = connector.connect(&url) => result,
    };

    let mut link = match connected {
        Ok(link) => link,
        Err(e) => {
            tracing::warn!(error = %e, generation, "Connection attempt failed");
            let _ = event_tx.send(LinkEvent::ConnectFailed {
                generation,
                error: e.to_string(),
            });
            return;
        }
    };
    let _ = event_tx.send(LinkEvent::Opened { generation });

    let reason = loop {
        tokio::select! {
            () = cancel.cancelled() => {
                link.close().await;
                return;
            }
            outbound = outbound_rx.recv() => {
                let Some(text) = outbound else {
                    link.close().await;
                    return;
                };
                if let Err(e) = link.send(text).await {
                    tracing::warn!(error = %e, generation, "Send failed, dropping connection");
                    break Some(e.to_string());
                }
            }
            inbound = link.recv() => match inbound {
                Some(Ok(text)) => {
                    let _ = event_tx.send(LinkEvent::Frame { generation, text });
                }
                Some(Err(e)) => {
                    tracing::warn!(error = %e, generation, "Receive failed, dropping connection");
                    break Some(e.to_string());
                }
                None => {
                    tracing::info!(generation, "Connection closed by peer");
                    break None;
                }
            }
        }
    };

    // Refuse further frames before the owner learns of the loss
    drop(outbound_rx);
    let _ = event_tx.send(LinkEvent::Dropped { generation, reason });
}
