//! Table-driven machine implementing the [`Machine`] contract.

use crate::core::{MachineContext, MachineEvent, State, StateHistory, StateSnapshot, StateTransition};
use crate::effects::transition::Transition;
use crate::machine::{EventBroker, Machine, MachineError, TransitionListener, TransitionUpdate};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::debug;

/// A named machine whose behavior is a list of [`Transition`] rows.
///
/// Rows are tried in declaration order; the first one whose source state,
/// event name and guard all match fires. Events that match no row are
/// ignored.
pub struct StateMachine<S: State, C: MachineContext> {
    name: String,
    initial: S,
    initial_context: C,
    current: S,
    context: C,
    transitions: Arc<Vec<Transition<S, C>>>,
    history: StateHistory<S>,
    listeners: Vec<TransitionListener>,
    broker: Option<Arc<dyn EventBroker>>,
}

impl<S: State, C: MachineContext> StateMachine<S, C> {
    /// Create a machine in its initial state and context.
    pub fn new(name: impl Into<String>, initial: S, context: C) -> Self {
        Self {
            name: name.into(),
            current: initial.clone(),
            context: context.clone(),
            initial,
            initial_context: context,
            transitions: Arc::new(Vec::new()),
            history: StateHistory::new(),
            listeners: Vec::new(),
            broker: None,
        }
    }

    /// Append a row to the transition table.
    pub fn add_transition(&mut self, transition: Transition<S, C>) {
        Arc::make_mut(&mut self.transitions).push(transition);
    }

    pub fn state(&self) -> &S {
        &self.current
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn is_final(&self) -> bool {
        self.current.is_final()
    }

    pub fn history(&self) -> &StateHistory<S> {
        &self.history
    }

    fn matching_row(&self, event: &MachineEvent) -> Option<usize> {
        self.transitions
            .iter()
            .position(|t| t.can_execute(&self.current, &self.context, event))
    }

    fn notify(&self, update: &TransitionUpdate) {
        for listener in &self.listeners {
            listener(update);
        }
    }

    fn emit(&self, events: Vec<MachineEvent>) {
        let Some(broker) = &self.broker else {
            if !events.is_empty() {
                debug!(
                    machine = %self.name,
                    dropped = events.len(),
                    "no broker attached, dropping follow-up events"
                );
            }
            return;
        };

        for event in events {
            let event = match event.to_machine {
                Some(_) => event,
                None => event.to(self.name.clone()),
            };
            broker.dispatch(event);
        }
    }
}

#[async_trait]
impl<S: State, C: MachineContext> Machine for StateMachine<S, C> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn accept(&mut self, event: MachineEvent) -> Result<(), MachineError> {
        if event.is_reset() {
            debug!(machine = %self.name, "reset events are handled by the manager, ignoring");
            return Ok(());
        }

        let Some(row) = self.matching_row(&event) else {
            debug!(
                machine = %self.name,
                state = self.current.name(),
                event = event.name(),
                "no transition matches, ignoring event"
            );
            return Ok(());
        };

        let table = Arc::clone(&self.transitions);
        let transition = &table[row];

        let next_context = transition.next_context(&self.context, &event).await?;
        let context_value = serde_json::to_value(&next_context)?;

        let previous = std::mem::replace(&mut self.current, transition.to.clone());
        self.context = next_context;
        self.history = self.history.record(StateTransition {
            from: previous.clone(),
            to: self.current.clone(),
            event: event.name().to_string(),
            event_id: event.id.clone(),
            timestamp: Utc::now(),
        });

        debug!(
            machine = %self.name,
            from = previous.name(),
            to = self.current.name(),
            event = event.name(),
            "transitioned"
        );

        let follow_ups = transition.follow_ups(&self.context, &event);

        self.notify(&TransitionUpdate {
            machine: self.name.clone(),
            previous_state: previous.name().to_string(),
            event,
            next_state: self.current.name().to_string(),
            context: context_value,
        });
        self.emit(follow_ups);

        Ok(())
    }

    fn current_state(&self) -> Result<StateSnapshot, MachineError> {
        Ok(StateSnapshot::new(
            self.current.name(),
            serde_json::to_value(&self.context)?,
        ))
    }

    fn add_listener(&mut self, listener: TransitionListener) {
        self.listeners.push(listener);
    }

    fn add_broker(&mut self, broker: Arc<dyn EventBroker>) {
        self.broker = Some(broker);
    }

    /// Fresh copy in the initial state and context with an empty history.
    /// Listeners, broker and the transition table carry over.
    fn restart(&self) -> Box<dyn Machine> {
        Box::new(Self {
            name: self.name.clone(),
            initial: self.initial.clone(),
            initial_context: self.initial_context.clone(),
            current: self.initial.clone(),
            context: self.initial_context.clone(),
            transitions: Arc::clone(&self.transitions),
            history: StateHistory::new(),
            listeners: self.listeners.clone(),
            broker: self.broker.clone(),
        })
    }
}
