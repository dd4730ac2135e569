//! Guard predicates for controlling transitions.
//!
//! A guard looks at the machine's context and the incoming event and decides
//! whether a matching transition may fire. Guards are pure: they never touch
//! the context and never emit events.

use super::event::MachineEvent;
use std::sync::Arc;

/// Pure predicate over a context and an incoming event.
///
/// # Example
///
/// ```rust
/// use machinist::core::{Guard, MachineEvent};
///
/// struct Attempts {
///     remaining: u32,
/// }
///
/// let has_attempts = Guard::new(|ctx: &Attempts, _event: &MachineEvent| ctx.remaining > 0);
/// let retry = MachineEvent::new("signIn", "retry");
///
/// assert!(has_attempts.check(&Attempts { remaining: 1 }, &retry));
/// assert!(!has_attempts.check(&Attempts { remaining: 0 }, &retry));
/// ```
pub struct Guard<C> {
    predicate: Arc<dyn Fn(&C, &MachineEvent) -> bool + Send + Sync>,
}

impl<C> Guard<C> {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&C, &MachineEvent) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Arc::new(predicate),
        }
    }

    /// Guard that only looks at the event payload.
    pub fn on_payload<F>(predicate: F) -> Self
    where
        F: Fn(&serde_json::Value) -> bool + Send + Sync + 'static,
    {
        Self::new(move |_, event| predicate(&event.payload))
    }

    pub fn check(&self, context: &C, event: &MachineEvent) -> bool {
        (self.predicate)(context, event)
    }
}

impl<C> Clone for Guard<C> {
    fn clone(&self) -> Self {
        Self {
            predicate: Arc::clone(&self.predicate),
        }
    }
}
