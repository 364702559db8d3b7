use std::fmt::Debug;

use thiserror::Error;

/// An action arrived in a state that does not accept it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("illegal action {action} for state {state}")]
pub struct IllegalActionError {
    pub action: String,
    pub state: String,
}

impl IllegalActionError {
    pub fn new(action: &impl Debug, state: &impl Debug) -> Self {
        Self {
            action: format!("{:?}", action),
            state: format!("{:?}", state),
        }
    }
}

/// How a [`StateMachine`](super::StateMachine) treats illegal actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IllegalActionPolicy {
    /// Surface the error to the caller. The runtime stops.
    Strict,
    /// Keep the state, emit the reducer's reporting effect and continue.
    Report,
}

impl Default for IllegalActionPolicy {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            IllegalActionPolicy::Strict
        } else {
            IllegalActionPolicy::Report
        }
    }
}

/// Errors surfaced by a running machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MachineError {
    #[error(transparent)]
    IllegalAction(#[from] IllegalActionError),

    #[error("state machine stopped")]
    Stopped,
}
