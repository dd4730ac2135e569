//! Machinist: serialized coordination of cooperating state machines
//!
//! Machinist keeps a set of named, event-driven machines consistent under
//! concurrent callers. Machines react to events by transitioning and by
//! emitting follow-up events for each other; a [`MachineManager`] routes those
//! events, processes exactly one caller request at a time and resolves each
//! request only after every follow-up it caused has settled.
//!
//! # Core Concepts
//!
//! - **State**: Type-safe state representation via the `State` trait
//! - **Events**: [`MachineEvent`] values addressed to a machine by name
//! - **Machines**: Anything implementing the [`Machine`] contract; the
//!   table-driven [`StateMachine`] is provided
//! - **Manager**: The serializing host that owns the machines and both queues
//!
//! # Example
//!
//! ```rust
//! use machinist::{MachineEvent, MachineManager, ManagerOptions, StateMachineBuilder};
//! use machinist::state_enum;
//!
//! state_enum! {
//!     enum SignIn {
//!         SignedOut,
//!         SignedIn,
//!     }
//!     initial: SignedOut
//! }
//!
//! state_enum! {
//!     enum Tokens {
//!         Empty,
//!         Stored,
//!     }
//!     initial: Empty
//! }
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let sign_in = StateMachineBuilder::new("signIn")
//!     .initial(SignIn::SignedOut)
//!     .context(())
//!     .transition(
//!         machinist::TransitionBuilder::new()
//!             .from(SignIn::SignedOut)
//!             .on("submit")
//!             .to(SignIn::SignedIn)
//!             .emit(MachineEvent::new("tokens", "store")),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let tokens = StateMachineBuilder::new("tokens")
//!     .initial(Tokens::Empty)
//!     .context(())
//!     .on(Tokens::Empty, "store", Tokens::Stored)
//!     .build()
//!     .unwrap();
//!
//! let manager = MachineManager::new(ManagerOptions::new("auth"));
//! manager.add_machine_if_absent(sign_in);
//! manager.add_machine_if_absent(tokens);
//!
//! let snapshot = manager.send(MachineEvent::new("signIn", "submit")).await.unwrap();
//! assert_eq!(snapshot.state, "SignedIn");
//!
//! // The follow-up event was handled before `send` resolved.
//! let tokens = manager.current_state("tokens").await.unwrap();
//! assert_eq!(tokens.state, "Stored");
//! # });
//! ```

pub mod builder;
pub mod core;
pub mod effects;
pub mod machine;
pub mod manager;

// Re-export commonly used types
pub use builder::{BuildError, BuildErrors, StateMachineBuilder, TransitionBuilder};
pub use core::{
    EventId, EventKind, Guard, MachineContext, MachineEvent, State, StateHistory, StateSnapshot,
    StateTransition,
};
pub use effects::{StateMachine, Transition};
pub use machine::{EventBroker, Machine, MachineError, TransitionListener, TransitionUpdate};
pub use manager::{MachineManager, ManagerError, ManagerOptions, Pending};
