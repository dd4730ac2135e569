//! Builder for constructing table-driven machines.

use crate::builder::error::{BuildError, BuildErrors};
use crate::builder::transition::{require, TransitionBuilder};
use crate::core::{MachineContext, State};
use crate::effects::{StateMachine, Transition};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

enum Row<S: State, C: MachineContext> {
    Pending(TransitionBuilder<S, C>),
    Built(Transition<S, C>),
}

/// Builder for [`StateMachine`] with a fluent API.
///
/// Validation accumulates: a definition with several problems reports all of
/// them from a single `build()` call.
pub struct StateMachineBuilder<S: State, C: MachineContext> {
    name: String,
    initial: Option<S>,
    context: Option<C>,
    rows: Vec<Row<S, C>>,
}

impl<S: State, C: MachineContext> StateMachineBuilder<S, C> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            initial: None,
            context: None,
            rows: Vec::new(),
        }
    }

    /// Set the initial state (required).
    pub fn initial(mut self, state: S) -> Self {
        self.initial = Some(state);
        self
    }

    /// Set the initial context (required).
    pub fn context(mut self, context: C) -> Self {
        self.context = Some(context);
        self
    }

    /// Add a transition from a builder; it is validated with the rest of the
    /// definition at `build()`.
    pub fn transition(mut self, builder: TransitionBuilder<S, C>) -> Self {
        self.rows.push(Row::Pending(builder));
        self
    }

    /// Add a pre-built transition.
    pub fn add_transition(mut self, transition: Transition<S, C>) -> Self {
        self.rows.push(Row::Built(transition));
        self
    }

    /// Shorthand for an unguarded `from --event--> to` row.
    pub fn on(self, from: S, event: impl Into<String>, to: S) -> Self {
        self.transition(TransitionBuilder::new().from(from).on(event).to(to))
    }

    fn validate(&self) -> Validation<(), NonEmptyVec<BuildError>> {
        let mut checks = vec![
            require(!self.name.trim().is_empty(), BuildError::MissingName),
            require(self.initial.is_some(), BuildError::MissingInitialState),
            require(self.context.is_some(), BuildError::MissingInitialContext),
            require(!self.rows.is_empty(), BuildError::NoTransitions),
        ];

        for (index, row) in self.rows.iter().enumerate() {
            if let Row::Pending(builder) = row {
                checks.push(builder.validate(index));
            }
        }

        Validation::all_vec(checks).map(|_| ())
    }

    /// Build the machine, or report every problem in the definition.
    pub fn build(self) -> Result<StateMachine<S, C>, BuildErrors> {
        if let Validation::Failure(errors) = self.validate() {
            return Err(errors.into());
        }

        let initial = self.initial.ok_or(BuildError::MissingInitialState)?;
        let context = self.context.ok_or(BuildError::MissingInitialContext)?;
        let mut machine = StateMachine::new(self.name, initial, context);

        for (index, row) in self.rows.into_iter().enumerate() {
            let transition = match row {
                Row::Pending(builder) => builder.finish(index)?,
                Row::Built(transition) => transition,
            };
            machine.add_transition(transition);
        }

        Ok(machine)
    }
}

impl<S: State, C: MachineContext + Default> StateMachineBuilder<S, C> {
    /// Use `C::default()` as the initial context.
    pub fn default_context(self) -> Self {
        self.context(C::default())
    }
}
