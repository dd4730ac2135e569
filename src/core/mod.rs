//! Core value types shared by machines and the manager.
//!
//! - States and contexts via the [`State`] and [`MachineContext`] traits
//! - Events and their routing keys
//! - Snapshots handed back to manager callers
//! - Guard predicates and immutable transition history
//!
//! Nothing in this module performs I/O or holds shared mutable state.

mod event;
mod guard;
mod history;
mod snapshot;
mod state;

pub use event::{EventId, EventKind, MachineEvent};
pub use guard::Guard;
pub use history::{StateHistory, StateTransition};
pub use snapshot::StateSnapshot;
pub use state::{MachineContext, State};
