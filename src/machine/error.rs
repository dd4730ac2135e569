//! Machine error types.

use thiserror::Error;

/// Errors a machine may raise while accepting an event.
#[derive(Debug, Error)]
pub enum MachineError {
    /// A transition's action failed; the machine stays where it was
    #[error("Transition action failed in '{machine}' on '{event}': {reason}")]
    ActionFailed {
        machine: String,
        event: String,
        reason: String,
    },

    /// The machine refused the event outright
    #[error("Machine '{machine}' rejected event '{event}': {reason}")]
    Rejected {
        machine: String,
        event: String,
        reason: String,
    },

    /// The context could not be converted for a snapshot or listener update
    #[error("Context serialization failed: {0}")]
    Context(#[from] serde_json::Error),
}

impl MachineError {
    pub fn action_failed(
        machine: impl Into<String>,
        event: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::ActionFailed {
            machine: machine.into(),
            event: event.into(),
            reason: reason.into(),
        }
    }
}
