//! Pure connection state transition function
//!
//! Given the same state, context and event this always produces the same
//! result; all I/O happens in the executor.

use super::{LinkContext, LinkEffect, LinkEvent, LinkState};

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: LinkState,
    pub effects: Vec<LinkEffect>,
}

impl TransitionResult {
    pub fn new(state: LinkState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: LinkEffect) -> Self {
        self.effects.push(effect);
        self
    }

    /// True when the event had no bearing on the current state
    pub fn is_noop(&self, previous: &LinkState) -> bool {
        self.effects.is_empty() && &self.new_state == previous
    }
}

fn dial(session_id: String, generation: u64) -> TransitionResult {
    TransitionResult::new(LinkState::Connecting {
        session_id: session_id.clone(),
        generation,
    })
    .with_effect(LinkEffect::Dial {
        session_id,
        generation,
    })
}

fn drop_and_retry(context: &LinkContext, generation: u64) -> TransitionResult {
    TransitionResult::new(LinkState::Closed { generation })
        .with_effect(LinkEffect::ReleaseLink)
        .with_effect(LinkEffect::ScheduleReconnect {
            delay: context.reconnect_delay,
            generation,
        })
}

pub fn transition(state: &LinkState, context: &LinkContext, event: LinkEvent) -> TransitionResult {
    match (state, event) {
        // ============================================================
        // Teardown: absorbing, from every state
        // ============================================================
        (LinkState::Stopped, _) => TransitionResult::new(LinkState::Stopped),

        (_, LinkEvent::Shutdown) => TransitionResult::new(LinkState::Stopped)
            .with_effect(LinkEffect::CancelReconnect)
            .with_effect(LinkEffect::ReleaseLink),

        // ============================================================
        // Starting an attempt
        // ============================================================
        (LinkState::Idle, LinkEvent::Connect { session_id }) => {
            dial(session_id, state.next_generation())
        }

        // Explicit connect while waiting out the delay: skip the wait
        (LinkState::Closed { .. }, LinkEvent::Connect { session_id }) => {
            let mut result = dial(session_id, state.next_generation());
            result.effects.insert(0, LinkEffect::CancelReconnect);
            result
        }

        (LinkState::Closed { generation }, LinkEvent::ReconnectDue { generation: due, session_id })
            if *generation == due =>
        {
            dial(session_id, state.next_generation())
        }

        // ============================================================
        // Link task outcomes for the current attempt
        // ============================================================
        (LinkState::Connecting { session_id, generation }, LinkEvent::Opened { generation: g })
            if *generation == g =>
        {
            TransitionResult::new(LinkState::Open {
                session_id: session_id.clone(),
                generation: g,
            })
        }

        (LinkState::Connecting { generation, .. }, LinkEvent::ConnectFailed { generation: g, .. })
        | (LinkState::Connecting { generation, .. }, LinkEvent::Dropped { generation: g, .. })
        | (LinkState::Open { generation, .. }, LinkEvent::Dropped { generation: g, .. })
            if *generation == g =>
        {
            drop_and_retry(context, g)
        }

        (LinkState::Open { generation, .. }, LinkEvent::Frame { generation: g, text })
            if *generation == g =>
        {
            TransitionResult::new(state.clone()).with_effect(LinkEffect::Deliver { text })
        }

        // ============================================================
        // Everything else: duplicate connects, stale generations
        // ============================================================
        (state, _) => TransitionResult::new(state.clone()),
    }
}
