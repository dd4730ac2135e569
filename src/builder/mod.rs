//! Builder API for ergonomic machine construction.
//!
//! Fluent builders and the [`state_enum!`](crate::state_enum) macro for
//! defining table-driven machines with minimal boilerplate.

pub mod error;
pub mod machine;
pub mod macros;
pub mod transition;

pub use error::{BuildError, BuildErrors};
pub use machine::StateMachineBuilder;
pub use transition::TransitionBuilder;

use crate::core::{MachineContext, State};
use crate::effects::Transition;

/// Create an unguarded `from --event--> to` transition with no side effects.
///
/// # Example
///
/// ```
/// use machinist::builder::simple_transition;
/// use machinist::state_enum;
///
/// state_enum! {
///     enum Door {
///         Open,
///         Closed,
///     }
/// }
///
/// let close = simple_transition::<Door, ()>(Door::Open, "close", Door::Closed);
/// assert_eq!(close.to, Door::Closed);
/// ```
pub fn simple_transition<S, C>(from: S, event: impl Into<String>, to: S) -> Transition<S, C>
where
    S: State,
    C: MachineContext,
{
    Transition {
        from,
        event: event.into(),
        to,
        guard: None,
        reducer: None,
        action: None,
        emits: Vec::new(),
    }
}
