//! Transition table entries.

use crate::core::{Guard, MachineContext, MachineEvent, State};
use crate::machine::MachineError;
use futures::future::BoxFuture;
use std::sync::Arc;

/// Pure context update applied when a transition fires.
pub type ContextReducer<C> = Arc<dyn Fn(&mut C, &MachineEvent) + Send + Sync>;

/// Effectful step run after the reducer. Receives the reduced context and
/// returns the context to commit, or an error that cancels the transition.
pub type TransitionAction<C> =
    Arc<dyn Fn(C, MachineEvent) -> BoxFuture<'static, Result<C, MachineError>> + Send + Sync>;

/// Builds a follow-up event from the committed context.
pub type EventEmitter<C> = Arc<dyn Fn(&C, &MachineEvent) -> Option<MachineEvent> + Send + Sync>;

/// One row of a machine's transition table: on `event` in state `from`, go
/// to `to`.
pub struct Transition<S: State, C: MachineContext> {
    pub from: S,
    pub event: String,
    pub to: S,
    pub guard: Option<Guard<C>>,
    pub reducer: Option<ContextReducer<C>>,
    pub action: Option<TransitionAction<C>>,
    pub emits: Vec<EventEmitter<C>>,
}

impl<S: State, C: MachineContext> Transition<S, C> {
    /// Check whether this row fires for `event` in the given state (pure).
    pub fn can_execute(&self, current: &S, context: &C, event: &MachineEvent) -> bool {
        if event.is_reset() || *current != self.from || event.name() != self.event {
            return false;
        }

        self.guard
            .as_ref()
            .map_or(true, |g| g.check(context, event))
    }

    /// Compute the context to commit, running the reducer and then the action.
    pub(crate) async fn next_context(
        &self,
        context: &C,
        event: &MachineEvent,
    ) -> Result<C, MachineError> {
        let mut next = context.clone();
        if let Some(reduce) = &self.reducer {
            reduce(&mut next, event);
        }

        match &self.action {
            Some(action) => action(next, event.clone()).await,
            None => Ok(next),
        }
    }

    /// Follow-up events for the committed context, in declaration order.
    pub(crate) fn follow_ups(&self, context: &C, event: &MachineEvent) -> Vec<MachineEvent> {
        self.emits
            .iter()
            .filter_map(|emit| emit(context, event))
            .collect()
    }
}

impl<S: State, C: MachineContext> Clone for Transition<S, C> {
    fn clone(&self) -> Self {
        Self {
            from: self.from.clone(),
            event: self.event.clone(),
            to: self.to.clone(),
            guard: self.guard.clone(),
            reducer: self.reducer.clone(),
            action: self.action.clone(),
            emits: self.emits.clone(),
        }
    }
}
