//! Builder for transition table rows.

use crate::builder::error::{BuildError, BuildErrors};
use crate::core::{Guard, MachineContext, MachineEvent, State};
use crate::effects::{ContextReducer, EventEmitter, Transition, TransitionAction};
use crate::machine::MachineError;
use futures::future::BoxFuture;
use std::sync::Arc;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Builder for constructing transitions with a fluent API.
///
/// # Example
///
/// ```
/// use machinist::builder::TransitionBuilder;
/// use machinist::core::MachineEvent;
/// use machinist::state_enum;
///
/// state_enum! {
///     enum Tokens {
///         Empty,
///         Stored,
///     }
/// }
///
/// let store = TransitionBuilder::<Tokens, u32>::new()
///     .from(Tokens::Empty)
///     .on("store")
///     .to(Tokens::Stored)
///     .reduce(|stored, _| *stored += 1)
///     .emit(MachineEvent::new("signIn", "tokens_stored"))
///     .build()
///     .unwrap();
///
/// assert_eq!(store.event, "store");
/// ```
pub struct TransitionBuilder<S: State, C: MachineContext> {
    from: Option<S>,
    event: Option<String>,
    to: Option<S>,
    guard: Option<Guard<C>>,
    reducer: Option<ContextReducer<C>>,
    action: Option<TransitionAction<C>>,
    emits: Vec<EventEmitter<C>>,
}

impl<S: State, C: MachineContext> TransitionBuilder<S, C> {
    pub fn new() -> Self {
        Self {
            from: None,
            event: None,
            to: None,
            guard: None,
            reducer: None,
            action: None,
            emits: Vec::new(),
        }
    }

    /// Set the source state (required).
    pub fn from(mut self, state: S) -> Self {
        self.from = Some(state);
        self
    }

    /// Set the triggering event name (required).
    pub fn on(mut self, event: impl Into<String>) -> Self {
        self.event = Some(event.into());
        self
    }

    /// Set the target state (required).
    pub fn to(mut self, state: S) -> Self {
        self.to = Some(state);
        self
    }

    pub fn guard(mut self, guard: Guard<C>) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Add a guard using a closure.
    pub fn when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&C, &MachineEvent) -> bool + Send + Sync + 'static,
    {
        self.guard = Some(Guard::new(predicate));
        self
    }

    /// Pure context update run first when the transition fires.
    pub fn reduce<F>(mut self, reducer: F) -> Self
    where
        F: Fn(&mut C, &MachineEvent) + Send + Sync + 'static,
    {
        self.reducer = Some(Arc::new(reducer));
        self
    }

    /// Async step run on the reduced context. An error cancels the transition.
    pub fn action<F>(mut self, action: F) -> Self
    where
        F: Fn(C, MachineEvent) -> BoxFuture<'static, Result<C, MachineError>>
            + Send
            + Sync
            + 'static,
    {
        self.action = Some(Arc::new(action));
        self
    }

    /// Emit a fixed follow-up event after every firing.
    pub fn emit(self, event: MachineEvent) -> Self {
        self.emit_with(move |_, _| Some(event.clone()))
    }

    /// Emit a follow-up event computed from the committed context.
    pub fn emit_with<F>(mut self, emitter: F) -> Self
    where
        F: Fn(&C, &MachineEvent) -> Option<MachineEvent> + Send + Sync + 'static,
    {
        self.emits.push(Arc::new(emitter));
        self
    }

    /// Collect every missing required field, tagged with the row's position.
    pub(crate) fn validate(&self, index: usize) -> Validation<(), NonEmptyVec<BuildError>> {
        let checks = vec![
            require(self.from.is_some(), BuildError::MissingFromState { index }),
            require(self.event.is_some(), BuildError::MissingEvent { index }),
            require(self.to.is_some(), BuildError::MissingToState { index }),
        ];
        Validation::all_vec(checks).map(|_| ())
    }

    /// Assemble the row. Callers validate first; this still fails cleanly on
    /// the first missing field.
    pub(crate) fn finish(self, index: usize) -> Result<Transition<S, C>, BuildError> {
        Ok(Transition {
            from: self.from.ok_or(BuildError::MissingFromState { index })?,
            event: self.event.ok_or(BuildError::MissingEvent { index })?,
            to: self.to.ok_or(BuildError::MissingToState { index })?,
            guard: self.guard,
            reducer: self.reducer,
            action: self.action,
            emits: self.emits,
        })
    }

    /// Build a standalone transition, reporting every missing field.
    pub fn build(self) -> Result<Transition<S, C>, BuildErrors> {
        if let Validation::Failure(errors) = self.validate(0) {
            return Err(errors.into());
        }
        Ok(self.finish(0)?)
    }
}

impl<S: State, C: MachineContext> Default for TransitionBuilder<S, C> {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn require(ok: bool, error: BuildError) -> Validation<(), NonEmptyVec<BuildError>> {
    if ok {
        Validation::success(())
    } else {
        Validation::fail(error)
    }
}
