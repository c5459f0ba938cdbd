//! Transaction State Machine
//!
//! Tracks one request/response exchange:
//! ```text
//! Idle -> Opened -> Sent -> AwaitingReply -> Finished(outcome) -> Closed
//! ```
//! A communication failure may finish the exchange from any state before
//! `Finished`; success and fault replies only from `AwaitingReply`.

use crate::outcome::TransactionResult;

/// States of a single exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionState {
    /// Nothing acquired yet
    Idle,
    /// Serial channel is open
    Opened,
    /// Request line written and flushed
    Sent,
    /// Blocked on the reply line
    AwaitingReply,
    /// Outcome known, channel still held
    Finished(TransactionResult),
    /// Channel released
    Closed,
}

/// Events that drive the exchange forward
#[derive(Debug, Clone, PartialEq)]
pub enum TransactionEvent {
    /// Channel acquired
    ChannelOpened,
    /// Request line written
    CommandSent,
    /// Started waiting for the reply
    ReadStarted,
    /// Exchange produced an outcome
    Resolved(TransactionResult),
    /// Channel released
    ChannelClosed,
}

/// Result of a state transition attempt
#[derive(Debug, Clone)]
pub enum TransitionResult {
    /// Transition was valid and state changed
    Success(TransactionState),
    /// Transition was invalid from current state
    Invalid {
        from: TransactionState,
        event: TransactionEvent,
    },
}

/// State machine for one exchange with the controller
#[derive(Debug)]
pub struct TransactionStateMachine {
    current_state: TransactionState,
    outcome: Option<TransactionResult>,
}

impl Default for TransactionStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionStateMachine {
    /// Create a new state machine in Idle state
    pub fn new() -> Self {
        Self {
            current_state: TransactionState::Idle,
            outcome: None,
        }
    }

    /// Get current state
    pub fn state(&self) -> &TransactionState {
        &self.current_state
    }

    /// Outcome recorded when the exchange finished, kept after close
    pub fn outcome(&self) -> Option<&TransactionResult> {
        self.outcome.as_ref()
    }

    pub fn is_closed(&self) -> bool {
        self.current_state == TransactionState::Closed
    }

    /// Process an event and return the transition result
    pub fn process_event(&mut self, event: TransactionEvent) -> TransitionResult {
        match self.get_next_state(&event) {
            Some(state) => {
                if let TransactionState::Finished(ref result) = state {
                    self.outcome = Some(result.clone());
                }
                self.current_state = state.clone();
                TransitionResult::Success(state)
            }
            None => TransitionResult::Invalid {
                from: self.current_state.clone(),
                event,
            },
        }
    }

    /// Get the next state for a given event, if the transition is valid
    fn get_next_state(&self, event: &TransactionEvent) -> Option<TransactionState> {
        use TransactionEvent::*;
        use TransactionState::*;

        match (&self.current_state, event) {
            (Idle, ChannelOpened) => Some(Opened),
            (Opened, CommandSent) => Some(Sent),
            (Sent, ReadStarted) => Some(AwaitingReply),

            // Only a reply can produce success or a fault
            (AwaitingReply, Resolved(result)) => Some(Finished(result.clone())),

            // Failures can end the exchange early
            (Idle | Opened | Sent, Resolved(result @ TransactionResult::CommunicationFailure(_))) => {
                Some(Finished(result.clone()))
            }

            (Finished(_), ChannelClosed) => Some(Closed),

            // Invalid transition
            _ => None,
        }
    }
}
