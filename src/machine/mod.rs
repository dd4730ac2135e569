//! The contract between a machine and the manager that hosts it.
//!
//! A manager knows nothing about transition tables. It only needs a machine
//! to report its name and snapshot, accept events, take listeners, take a
//! broker for emitting follow-up events, and produce a fresh copy of itself.
//! [`StateMachine`](crate::effects::StateMachine) is the table-driven
//! implementation shipped with this crate; anything else implementing
//! [`Machine`] can be registered alongside it.

mod error;

pub use error::MachineError;

use crate::core::{MachineEvent, StateSnapshot};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Capability handed to a machine so it can emit follow-up events without
/// knowing who consumes them.
pub trait EventBroker: Send + Sync {
    /// Enqueue an event. Never blocks on delivery.
    ///
    /// A manager routes dispatched events only while it processes a request.
    /// Events dispatched outside [`Machine::accept`] are held until the next
    /// request that routes events, and are delivered as part of it.
    fn dispatch(&self, event: MachineEvent);
}

impl<F> EventBroker for F
where
    F: Fn(MachineEvent) + Send + Sync,
{
    fn dispatch(&self, event: MachineEvent) {
        self(event)
    }
}

/// Passed to every listener after a transition completes.
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionUpdate {
    pub machine: String,
    pub previous_state: String,
    pub event: MachineEvent,
    pub next_state: String,
    /// Context after the transition
    pub context: Value,
}

/// Callback invoked on every transition a machine performs.
pub type TransitionListener = Arc<dyn Fn(&TransitionUpdate) + Send + Sync>;

/// A single finite-state machine that can be hosted by a
/// [`MachineManager`](crate::manager::MachineManager).
#[async_trait]
pub trait Machine: Send + Sync {
    /// Registry key. Must not change over the machine's lifetime.
    fn name(&self) -> &str;

    /// Perform zero or more transitions in response to `event`.
    ///
    /// Follow-up events go through the broker attached with
    /// [`add_broker`](Machine::add_broker) before this returns.
    async fn accept(&mut self, event: MachineEvent) -> Result<(), MachineError>;

    fn current_state(&self) -> Result<StateSnapshot, MachineError>;

    fn add_listener(&mut self, listener: TransitionListener);

    /// Attach the broker used for follow-up events, replacing any previous one.
    fn add_broker(&mut self, broker: Arc<dyn EventBroker>);

    /// A fresh instance with the same name, in its initial state and context.
    /// Whether listeners survive is up to the implementation.
    fn restart(&self) -> Box<dyn Machine>;
}
