//! Build errors for machine and transition builders.

use stillwater::NonEmptyVec;
use thiserror::Error;

/// A single problem found while validating a machine definition.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BuildError {
    #[error("Machine name is empty")]
    MissingName,

    #[error("Initial state not specified. Call .initial(state) before .build()")]
    MissingInitialState,

    #[error("Initial context not specified. Call .context(value) before .build()")]
    MissingInitialContext,

    #[error("No transitions defined. Add at least one transition")]
    NoTransitions,

    #[error("Transition #{index}: source state not specified. Call .from(state)")]
    MissingFromState { index: usize },

    #[error("Transition #{index}: target state not specified. Call .to(state)")]
    MissingToState { index: usize },

    #[error("Transition #{index}: event not specified. Call .on(event)")]
    MissingEvent { index: usize },
}

/// Every problem found in one definition, in discovery order.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("invalid machine definition: {}", describe(.0))]
pub struct BuildErrors(pub Vec<BuildError>);

fn describe(errors: &[BuildError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl BuildErrors {
    pub fn errors(&self) -> &[BuildError] {
        &self.0
    }

    pub fn contains(&self, error: &BuildError) -> bool {
        self.0.contains(error)
    }
}

impl From<BuildError> for BuildErrors {
    fn from(error: BuildError) -> Self {
        Self(vec![error])
    }
}

impl From<NonEmptyVec<BuildError>> for BuildErrors {
    fn from(errors: NonEmptyVec<BuildError>) -> Self {
        Self(errors.iter().cloned().collect())
    }
}
