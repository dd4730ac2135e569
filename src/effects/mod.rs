//! Table-driven machines.
//!
//! This is the "imperative shell" around the pure core: a [`StateMachine`]
//! owns its state and context, runs reducers and async actions when a
//! [`Transition`] fires, notifies listeners and pushes follow-up events to
//! whatever broker its host attached.
//!
//! Each transition commits in this order:
//!
//! 1. reducer on a copy of the context (pure)
//! 2. async action on the reduced copy; an error aborts with nothing committed
//! 3. state, context and history are updated
//! 4. listeners run, then follow-up events are dispatched

mod machine;
mod transition;

pub use machine::StateMachine;
pub use transition::{ContextReducer, EventEmitter, Transition, TransitionAction};
