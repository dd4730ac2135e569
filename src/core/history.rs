//! Transition history tracking.
//!
//! Every transition a typed machine performs is recorded as an immutable
//! [`StateTransition`]. Histories are values: recording returns a new history
//! and leaves the original untouched.

use super::event::EventId;
use super::state::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single transition and the event that caused it.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateTransition<S: State> {
    pub from: S,
    pub to: S,
    /// Name of the triggering event
    pub event: String,
    /// Id of the triggering event, when it had been assigned one
    pub event_id: Option<EventId>,
    pub timestamp: DateTime<Utc>,
}

/// Ordered history of transitions.
///
/// # Example
///
/// ```rust
/// use machinist::core::{State, StateHistory, StateTransition};
/// use serde::{Deserialize, Serialize};
/// use chrono::Utc;
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// enum Tokens { Empty, Stored, Cleared }
///
/// impl State for Tokens {
///     fn name(&self) -> &str {
///         match self {
///             Self::Empty => "Empty",
///             Self::Stored => "Stored",
///             Self::Cleared => "Cleared",
///         }
///     }
/// }
///
/// let history = StateHistory::new()
///     .record(StateTransition {
///         from: Tokens::Empty,
///         to: Tokens::Stored,
///         event: "store".to_string(),
///         event_id: None,
///         timestamp: Utc::now(),
///     })
///     .record(StateTransition {
///         from: Tokens::Stored,
///         to: Tokens::Cleared,
///         event: "clear".to_string(),
///         event_id: None,
///         timestamp: Utc::now(),
///     });
///
/// assert_eq!(history.get_path(), vec![&Tokens::Empty, &Tokens::Stored, &Tokens::Cleared]);
/// assert_eq!(history.events(), vec!["store", "clear"]);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateHistory<S: State> {
    transitions: Vec<StateTransition<S>>,
}

impl<S: State> Default for StateHistory<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> StateHistory<S> {
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    /// Record a transition, returning a new history.
    pub fn record(&self, transition: StateTransition<S>) -> Self {
        let mut transitions = self.transitions.clone();
        transitions.push(transition);
        Self { transitions }
    }

    /// States traversed: the first `from`, then each `to` in order.
    pub fn get_path(&self) -> Vec<&S> {
        let mut path = Vec::with_capacity(self.transitions.len() + 1);
        if let Some(first) = self.transitions.first() {
            path.push(&first.from);
        }
        path.extend(self.transitions.iter().map(|t| &t.to));
        path
    }

    /// Names of the events that drove each transition, oldest first.
    pub fn events(&self) -> Vec<&str> {
        self.transitions.iter().map(|t| t.event.as_str()).collect()
    }

    /// Time between the first and last recorded transition.
    pub fn duration(&self) -> Option<Duration> {
        let first = self.transitions.first()?;
        let last = self.transitions.last()?;
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    pub fn transitions(&self) -> &[StateTransition<S>] {
        &self.transitions
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}
