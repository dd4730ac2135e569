//! Manager error types.

use crate::core::EventId;
use crate::machine::MachineError;
use thiserror::Error;

/// Errors that reject a single queued manager request.
///
/// None of these stop the manager; the next queued request is processed as
/// usual. The exception is [`ManagerError::Stopped`], reported when the
/// processing task itself has died.
#[derive(Debug, Error)]
pub enum ManagerError {
    /// An event reached routing without a target machine name
    #[error("Event missing routing machine name. Event id {event_id}")]
    MissingRoute { event_id: EventId },

    /// A request referenced a machine that is not registered
    #[error("No state machine '{machine}' configured in manager '{manager}'. Expected one of {known:?}")]
    NotFound {
        manager: String,
        machine: String,
        known: Vec<String>,
    },

    /// Raised by the machine while accepting an event
    #[error(transparent)]
    Transition(#[from] MachineError),

    /// The machine could not produce a snapshot of its current state
    #[error("Failed to snapshot state machine '{machine}': {source}")]
    Snapshot {
        machine: String,
        #[source]
        source: MachineError,
    },

    /// The processing task panicked; no further requests will be served
    #[error("Machine manager '{manager}' has stopped processing requests")]
    Stopped { manager: String },
}

impl ManagerError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
