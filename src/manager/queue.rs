//! The cross-machine event queue and the broker that feeds it.

use crate::core::MachineEvent;
use crate::machine::EventBroker;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::trace;

/// FIFO of events awaiting routing. Shared between the drain loop and the
/// brokers handed to registered machines.
#[derive(Clone, Default)]
pub(crate) struct EventQueue {
    events: Arc<Mutex<VecDeque<MachineEvent>>>,
}

impl EventQueue {
    fn lock(&self) -> MutexGuard<'_, VecDeque<MachineEvent>> {
        // Only push/pop happen under the lock, so a poisoned queue is still consistent.
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn push(&self, event: MachineEvent) {
        self.lock().push_back(event);
    }

    pub(crate) fn pop(&self) -> Option<MachineEvent> {
        self.lock().pop_front()
    }

    /// Drop everything still queued, returning how many events were discarded.
    pub(crate) fn clear(&self) -> usize {
        let mut events = self.lock();
        let dropped = events.len();
        events.clear();
        dropped
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }
}

/// Broker attached to every machine a manager registers.
pub(crate) struct QueueBroker {
    pub(crate) manager: String,
    pub(crate) queue: EventQueue,
}

impl EventBroker for QueueBroker {
    fn dispatch(&self, event: MachineEvent) {
        trace!(
            manager = %self.manager,
            to_machine = ?event.to_machine,
            event = event.name(),
            "queued follow-up event"
        );
        self.queue.push(event);
    }
}
